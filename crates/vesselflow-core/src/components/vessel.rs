//! Vessel components - identity and host-side resource storage.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vesselflow_logic::oracle::VesselId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    pub id: VesselId,
    pub name: String,
}

impl Vessel {
    pub fn new(id: VesselId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Quantity of one resource and the most the vessel can hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub amount: f64,
    pub capacity: f64,
}

impl Stock {
    pub fn new(amount: f64, capacity: f64) -> Self {
        Self {
            amount: amount.clamp(0.0, capacity.max(0.0)),
            capacity: capacity.max(0.0),
        }
    }

    /// Fill level as a fraction of capacity (0-1)
    pub fn level(&self) -> f64 {
        if self.capacity > 0.0 {
            self.amount / self.capacity
        } else {
            0.0
        }
    }
}

/// Named resource stocks held by one vessel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    stocks: BTreeMap<String, Stock>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Into<String>, amount: f64, capacity: f64) -> Self {
        self.insert(resource, Stock::new(amount, capacity));
        self
    }

    pub fn insert(&mut self, resource: impl Into<String>, stock: Stock) {
        self.stocks.insert(resource.into(), stock);
    }

    pub fn get(&self, resource: &str) -> Option<&Stock> {
        self.stocks.get(resource)
    }

    /// Current amount, 0 for resources the vessel does not carry
    pub fn amount(&self, resource: &str) -> f64 {
        self.stocks.get(resource).map_or(0.0, |s| s.amount)
    }

    /// Remove up to `amount`; returns what was actually drawn
    pub fn draw(&mut self, resource: &str, amount: f64) -> f64 {
        match self.stocks.get_mut(resource) {
            Some(stock) if amount > 0.0 => {
                let drawn = amount.min(stock.amount);
                stock.amount -= drawn;
                drawn
            }
            _ => 0.0,
        }
    }

    /// Add up to `amount` without exceeding capacity; returns what was stored
    pub fn fill(&mut self, resource: &str, amount: f64) -> f64 {
        match self.stocks.get_mut(resource) {
            Some(stock) if amount > 0.0 => {
                let stored = amount.min(stock.capacity - stock.amount).max(0.0);
                stock.amount += stored;
                stored
            }
            _ => 0.0,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stock)> {
        self.stocks.iter().map(|(name, stock)| (name.as_str(), stock))
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

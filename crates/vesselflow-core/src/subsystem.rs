//! The advanced resource subsystem and the host services it is located through.
//!
//! When present, the subsystem owns every vessel's stocks and keeps an
//! attribution log of who drew or produced what. It is only reachable if
//! the host exposes all of its entry points; the engine probes for them once
//! at startup.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use vesselflow_logic::capability::ProbeError;
use vesselflow_logic::oracle::{ResourceOracle, VesselId};

use crate::components::ResourcePool;

/// Entry points the subsystem must expose to be usable.
pub const REQUIRED_ENTRY_POINTS: [&str; 3] = [
    "resources.available",
    "resources.consume",
    "resources.produce",
];

/// What the host process has loaded.
#[derive(Debug, Clone, Default)]
pub struct HostServices {
    entry_points: BTreeSet<String>,
}

impl HostServices {
    /// A host with nothing loaded.
    pub fn bare() -> Self {
        Self::default()
    }

    /// A host with the full resource subsystem loaded.
    pub fn with_resource_subsystem() -> Self {
        let mut host = Self::default();
        for name in REQUIRED_ENTRY_POINTS {
            host.register(name);
        }
        host
    }

    pub fn register(&mut self, entry_point: impl Into<String>) -> &mut Self {
        self.entry_points.insert(entry_point.into());
        self
    }

    pub fn has(&self, entry_point: &str) -> bool {
        self.entry_points.contains(entry_point)
    }

    pub fn is_empty(&self) -> bool {
        self.entry_points.is_empty()
    }
}

/// One mutation recorded for display and audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub vessel: VesselId,
    pub resource: String,
    /// Positive = produced, negative = consumed; what actually moved.
    pub amount: f64,
    pub label: String,
}

/// Scarcity-aware, vessel-wide resource accounting.
#[derive(Debug, Clone, Default)]
pub struct ResourceSubsystem {
    pools: HashMap<VesselId, ResourcePool>,
    attribution: Vec<FlowRecord>,
}

impl ResourceSubsystem {
    /// Bind to the subsystem through the host's entry points.
    pub fn locate(host: &HostServices) -> Result<Self, ProbeError> {
        if host.is_empty() {
            return Err(ProbeError::NotLoaded);
        }
        if let Some(missing) = REQUIRED_ENTRY_POINTS.iter().find(|name| !host.has(name)) {
            return Err(ProbeError::MissingEntryPoint((*missing).to_string()));
        }
        Ok(Self::default())
    }

    pub fn attach(&mut self, vessel: VesselId, pool: ResourcePool) {
        self.pools.insert(vessel, pool);
    }

    pub fn detach(&mut self, vessel: VesselId) -> Option<ResourcePool> {
        self.pools.remove(&vessel)
    }

    pub fn pool(&self, vessel: VesselId) -> Option<&ResourcePool> {
        self.pools.get(&vessel)
    }

    pub fn attribution(&self) -> &[FlowRecord] {
        &self.attribution
    }

    pub fn drain_attribution(&mut self) -> Vec<FlowRecord> {
        std::mem::take(&mut self.attribution)
    }

    fn record(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        if amount != 0.0 {
            self.attribution.push(FlowRecord {
                vessel,
                resource: resource.to_string(),
                amount,
                label: label.to_string(),
            });
        }
    }
}

impl ResourceOracle for ResourceSubsystem {
    fn available(&self, vessel: VesselId, resource: &str) -> f64 {
        self.pools
            .get(&vessel)
            .map_or(0.0, |pool| pool.amount(resource))
    }

    fn consume(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        let drawn = match self.pools.get_mut(&vessel) {
            Some(pool) => pool.draw(resource, amount),
            None => return,
        };
        self.record(vessel, resource, -drawn, label);
    }

    fn produce(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        let stored = match self.pools.get_mut(&vessel) {
            Some(pool) => pool.fill(resource, amount),
            None => return,
        };
        self.record(vessel, resource, stored, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIP: VesselId = VesselId(3);

    fn subsystem() -> ResourceSubsystem {
        let mut sub = ResourceSubsystem::locate(&HostServices::with_resource_subsystem())
            .expect("full host should bind");
        sub.attach(SHIP, ResourcePool::new().with("Power", 50.0, 100.0));
        sub
    }

    #[test]
    fn test_locate_bare_host() {
        assert_eq!(
            ResourceSubsystem::locate(&HostServices::bare()).unwrap_err(),
            ProbeError::NotLoaded
        );
    }

    #[test]
    fn test_locate_partial_host() {
        let mut host = HostServices::bare();
        host.register("resources.available")
            .register("resources.consume");
        assert_eq!(
            ResourceSubsystem::locate(&host).unwrap_err(),
            ProbeError::MissingEntryPoint("resources.produce".to_string())
        );
    }

    #[test]
    fn test_unknown_vessel_and_resource() {
        let mut sub = subsystem();
        assert_eq!(sub.available(VesselId(99), "Power"), 0.0);
        assert_eq!(sub.available(SHIP, "Water"), 0.0);
        sub.consume(VesselId(99), "Power", 5.0, "Ghost");
        sub.produce(SHIP, "Water", 5.0, "Ghost");
        assert!(sub.attribution().is_empty());
    }

    #[test]
    fn test_mutations_are_attributed() {
        let mut sub = subsystem();
        sub.consume(SHIP, "Power", 20.0, "Heater");
        sub.produce(SHIP, "Power", 5.0, "Panel");
        sub.consume(SHIP, "Power", 0.0, "Idle");

        assert_eq!(sub.available(SHIP, "Power"), 35.0);
        let log = sub.drain_attribution();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].amount, -20.0);
        assert_eq!(log[0].label, "Heater");
        assert_eq!(log[1].amount, 5.0);
        assert!(sub.attribution().is_empty());
    }

    #[test]
    fn test_production_capped_by_capacity() {
        let mut sub = subsystem();
        sub.produce(SHIP, "Power", 80.0, "Reactor");
        assert_eq!(sub.available(SHIP, "Power"), 100.0);
        assert_eq!(sub.attribution()[0].amount, 50.0);
    }
}

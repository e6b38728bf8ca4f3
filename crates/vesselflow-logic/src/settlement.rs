//! Throttled settlement reconciles a ledger against actual availability.
//!
//! Settlement runs in two passes over the same ledger:
//!
//! 1. Every consumer computes `requested = rate * elapsed` and the fraction of
//!    it the oracle can satisfy. The smallest fraction across all consumers
//!    becomes the throttle factor (1.0 when nothing consumes).
//! 2. Every request is applied scaled by that one factor, so all consumers
//!    are throttled together by the most constrained resource. Producers
//!    follow the same factor unless [`ProducerPolicy::Unthrottled`] is set.
//!
//! Nothing survives the call: a fresh ledger and settlement are built per tick.

use serde::{Deserialize, Serialize};

use crate::ledger::{RequestLedger, ResourceRequest};
use crate::oracle::{ResourceOracle, VesselId};

/// How producer entries respond to the throttle factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProducerPolicy {
    /// Outputs follow input scarcity: producers are scaled like consumers.
    #[default]
    Scaled,
    /// Producers always apply their full magnitude.
    Unthrottled,
}

/// Which oracle mutation a flow went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    Consumed,
    Produced,
}

/// One mutation issued during pass 2.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedFlow {
    pub resource: String,
    pub direction: FlowDirection,
    /// Non-negative magnitude handed to the oracle.
    pub amount: f64,
}

/// Result of a settlement: the factor plus every flow in ledger order.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementOutcome {
    pub factor: f64,
    pub flows: Vec<AppliedFlow>,
}

impl SettlementOutcome {
    /// Total magnitude applied for `resource` in `direction`.
    pub fn total(&self, resource: &str, direction: FlowDirection) -> f64 {
        self.flows
            .iter()
            .filter(|f| f.direction == direction && f.resource == resource)
            .map(|f| f.amount)
            .sum()
    }

    pub fn is_throttled(&self) -> bool {
        self.factor < 1.0
    }
}

/// Settlement of one ledger for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Settlement<'a> {
    ledger: &'a RequestLedger,
    producer_policy: ProducerPolicy,
}

impl<'a> Settlement<'a> {
    pub fn new(ledger: &'a RequestLedger) -> Self {
        Self {
            ledger,
            producer_policy: ProducerPolicy::default(),
        }
    }

    pub fn with_producer_policy(mut self, policy: ProducerPolicy) -> Self {
        self.producer_policy = policy;
        self
    }

    /// Settle the ledger and return the achieved throttle factor in [0, 1].
    ///
    /// Producers are scaled by the factor unless the settlement was built
    /// with [`ProducerPolicy::Unthrottled`]. A negative `elapsed_seconds`
    /// settles as zero duration.
    pub fn execute<O: ResourceOracle>(
        &self,
        oracle: &mut O,
        vessel: VesselId,
        label: &str,
        elapsed_seconds: f64,
    ) -> f64 {
        self.execute_detailed(oracle, vessel, label, elapsed_seconds)
            .factor
    }

    /// Settle the ledger and report every flow that was applied.
    pub fn execute_detailed<O: ResourceOracle>(
        &self,
        oracle: &mut O,
        vessel: VesselId,
        label: &str,
        elapsed_seconds: f64,
    ) -> SettlementOutcome {
        let elapsed_seconds = non_negative(elapsed_seconds);
        let factor = self.throttle_factor(&*oracle, vessel, elapsed_seconds);
        if factor < 1.0 {
            log::debug!(
                "{} '{}' throttled to {:.3} over {:.2}s",
                vessel,
                label,
                factor,
                elapsed_seconds
            );
        }

        let mut flows = Vec::with_capacity(self.ledger.len());
        for request in self.ledger {
            let amount = request.rate * elapsed_seconds * self.scale_for(request, factor);
            if !amount.is_finite() {
                log::warn!(
                    "{} '{}': skipping non-finite flow for {}",
                    vessel,
                    label,
                    request.name
                );
                continue;
            }
            if amount > 0.0 {
                oracle.consume(vessel, &request.name, amount, label);
                flows.push(AppliedFlow {
                    resource: request.name.clone(),
                    direction: FlowDirection::Consumed,
                    amount,
                });
            } else {
                let magnitude = amount.abs();
                oracle.produce(vessel, &request.name, magnitude, label);
                flows.push(AppliedFlow {
                    resource: request.name.clone(),
                    direction: FlowDirection::Produced,
                    amount: magnitude,
                });
            }
        }

        SettlementOutcome { factor, flows }
    }

    /// Pass 1: the minimum satisfiable fraction across all consumers.
    pub fn throttle_factor<O: ResourceOracle>(
        &self,
        oracle: &O,
        vessel: VesselId,
        elapsed_seconds: f64,
    ) -> f64 {
        let elapsed_seconds = non_negative(elapsed_seconds);
        let mut factor: f64 = 1.0;
        for request in self.ledger.iter().filter(|r| r.is_consumer()) {
            let requested = request.rate * elapsed_seconds;
            if requested <= 0.0 {
                continue;
            }
            let available = sanitize_available(oracle.available(vessel, &request.name));
            let capped = requested.min(available);
            factor = factor.min(capped / requested);
        }
        sanitize_factor(factor)
    }

    fn scale_for(&self, request: &ResourceRequest, factor: f64) -> f64 {
        match self.producer_policy {
            ProducerPolicy::Unthrottled if !request.is_consumer() => 1.0,
            _ => factor,
        }
    }
}

/// Time never runs backwards through a ledger. NaN passes through so pass 2
/// can skip it.
fn non_negative(elapsed_seconds: f64) -> f64 {
    if elapsed_seconds < 0.0 {
        0.0
    } else {
        elapsed_seconds
    }
}

/// A misbehaving oracle reading counts as nothing available.
fn sanitize_available(available: f64) -> f64 {
    if available.is_finite() {
        available.max(0.0)
    } else {
        0.0
    }
}

/// Clamp into [0, 1]; a non-finite factor pauses everything for this tick.
fn sanitize_factor(factor: f64) -> f64 {
    if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        log::warn!("non-finite throttle factor {factor}, treating as 0");
        0.0
    }
}

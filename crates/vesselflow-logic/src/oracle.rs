//! Availability oracle, the narrow query/mutate contract the settlement
//! engine uses to talk to whatever owns the actual resource quantities.

use serde::{Deserialize, Serialize};

/// Identity of a vessel as seen by the resource backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VesselId(pub u64);

impl std::fmt::Display for VesselId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vessel#{}", self.0)
    }
}

/// Query and mutation operations over per-vessel resource stocks.
///
/// Implementations must never fail: unknown vessels or resources report 0
/// availability and ignore mutations. Zero magnitudes are legal and must be
/// harmless.
pub trait ResourceOracle {
    /// Currently available quantity of `resource` on `vessel` (non-negative).
    fn available(&self, vessel: VesselId, resource: &str) -> f64;

    /// Draw `amount` of `resource`, attributing it to `label`.
    fn consume(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str);

    /// Add `amount` of `resource`, attributing it to `label`.
    fn produce(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str);
}

impl<O: ResourceOracle + ?Sized> ResourceOracle for &mut O {
    fn available(&self, vessel: VesselId, resource: &str) -> f64 {
        (**self).available(vessel, resource)
    }

    fn consume(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        (**self).consume(vessel, resource, amount, label);
    }

    fn produce(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        (**self).produce(vessel, resource, amount, label);
    }
}

/// Backend used when the advanced subsystem is absent: nothing is available
/// and every mutation is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullOracle;

impl ResourceOracle for NullOracle {
    fn available(&self, _vessel: VesselId, _resource: &str) -> f64 {
        0.0
    }

    fn consume(&mut self, _vessel: VesselId, _resource: &str, _amount: f64, _label: &str) {}

    fn produce(&mut self, _vessel: VesselId, _resource: &str, _amount: f64, _label: &str) {}
}

/// The resource backend chosen once at startup.
#[derive(Debug, Clone)]
pub enum ResourceBackend<O> {
    /// Advanced subsystem bound successfully.
    Live(O),
    /// Subsystem absent; all calls degrade to zero/no-op.
    Null(NullOracle),
}

impl<O> ResourceBackend<O> {
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    pub fn live(&self) -> Option<&O> {
        match self {
            Self::Live(oracle) => Some(oracle),
            Self::Null(_) => None,
        }
    }

    pub fn live_mut(&mut self) -> Option<&mut O> {
        match self {
            Self::Live(oracle) => Some(oracle),
            Self::Null(_) => None,
        }
    }
}

impl<O: ResourceOracle> ResourceOracle for ResourceBackend<O> {
    fn available(&self, vessel: VesselId, resource: &str) -> f64 {
        match self {
            Self::Live(oracle) => oracle.available(vessel, resource),
            Self::Null(null) => null.available(vessel, resource),
        }
    }

    fn consume(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        match self {
            Self::Live(oracle) => oracle.consume(vessel, resource, amount, label),
            Self::Null(null) => null.consume(vessel, resource, amount, label),
        }
    }

    fn produce(&mut self, vessel: VesselId, resource: &str, amount: f64, label: &str) {
        match self {
            Self::Live(oracle) => oracle.produce(vessel, resource, amount, label),
            Self::Null(null) => null.produce(vessel, resource, amount, label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Tank(HashMap<String, f64>);

    impl ResourceOracle for Tank {
        fn available(&self, _vessel: VesselId, resource: &str) -> f64 {
            self.0.get(resource).copied().unwrap_or(0.0)
        }

        fn consume(&mut self, _vessel: VesselId, resource: &str, amount: f64, _label: &str) {
            *self.0.entry(resource.to_string()).or_default() -= amount;
        }

        fn produce(&mut self, _vessel: VesselId, resource: &str, amount: f64, _label: &str) {
            *self.0.entry(resource.to_string()).or_default() += amount;
        }
    }

    #[test]
    fn test_null_oracle_is_inert() {
        let mut null = NullOracle;
        assert_eq!(null.available(VesselId(1), "Power"), 0.0);
        null.consume(VesselId(1), "Power", 10.0, "test");
        null.produce(VesselId(1), "Power", 0.0, "test");
        assert_eq!(null.available(VesselId(1), "Power"), 0.0);
    }

    #[test]
    fn test_backend_delegates_to_live() {
        let mut backend = ResourceBackend::Live(Tank::default());
        backend.produce(VesselId(7), "Water", 4.0, "test");
        backend.consume(VesselId(7), "Water", 1.0, "test");
        assert!(backend.is_live());
        assert_eq!(backend.available(VesselId(7), "Water"), 3.0);
    }

    #[test]
    fn test_null_backend() {
        let mut backend: ResourceBackend<Tank> = ResourceBackend::Null(NullOracle);
        backend.produce(VesselId(7), "Water", 4.0, "test");
        assert!(!backend.is_live());
        assert!(backend.live().is_none());
        assert_eq!(backend.available(VesselId(7), "Water"), 0.0);
    }

    #[test]
    fn test_vessel_id_display() {
        assert_eq!(VesselId(42).to_string(), "vessel#42");
    }
}

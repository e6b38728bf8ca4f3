//! Startup capability probe. Decides once whether the advanced resource
//! subsystem is present and which backend every caller gets.
//!
//! The result is an immutable value. Callers branch on
//! [`Capability::uses_settlement`] to pick either the throttled settlement
//! engine or the host's unconstrained per-tick path.

use thiserror::Error;

use crate::oracle::{NullOracle, ResourceBackend};

/// Which resource model is in effect for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Scarcity-aware subsystem present; settlement engine is used.
    Advanced,
    /// Subsystem absent; the unconstrained fallback is used instead.
    Unconstrained,
}

impl Capability {
    pub fn uses_settlement(self) -> bool {
        matches!(self, Self::Advanced)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Advanced => "advanced",
            Self::Unconstrained => "unconstrained",
        }
    }
}

/// Why the advanced subsystem could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("resource subsystem is not loaded")]
    NotLoaded,
    #[error("resource subsystem is missing entry point `{0}`")]
    MissingEntryPoint(String),
}

/// Something that can locate the advanced subsystem and bind an oracle to it.
pub trait SubsystemProbe {
    type Oracle;

    fn bind(self) -> Result<Self::Oracle, ProbeError>;
}

impl<O, F> SubsystemProbe for F
where
    F: FnOnce() -> Result<O, ProbeError>,
{
    type Oracle = O;

    fn bind(self) -> Result<O, ProbeError> {
        self()
    }
}

/// Run the probe exactly once and freeze the result.
///
/// A failed probe is not an error for the caller: it is logged here and
/// reported as [`Capability::Unconstrained`] with the null backend.
pub fn probe_backend<P: SubsystemProbe>(probe: P) -> (Capability, ResourceBackend<P::Oracle>) {
    match probe.bind() {
        Ok(oracle) => {
            log::info!("resource subsystem bound, using throttled settlement");
            (Capability::Advanced, ResourceBackend::Live(oracle))
        }
        Err(e) => {
            log::warn!("{e}; falling back to unconstrained consumption");
            (Capability::Unconstrained, ResourceBackend::Null(NullOracle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{ResourceOracle, VesselId};

    struct Fixed(f64);

    impl ResourceOracle for Fixed {
        fn available(&self, _vessel: VesselId, _resource: &str) -> f64 {
            self.0
        }

        fn consume(&mut self, _: VesselId, _: &str, _: f64, _: &str) {}

        fn produce(&mut self, _: VesselId, _: &str, _: f64, _: &str) {}
    }

    #[test]
    fn test_probe_success_is_advanced() {
        let (capability, backend) = probe_backend(|| Ok::<_, ProbeError>(Fixed(3.0)));
        assert_eq!(capability, Capability::Advanced);
        assert!(capability.uses_settlement());
        assert_eq!(backend.available(VesselId(1), "Power"), 3.0);
    }

    #[test]
    fn test_probe_missing_entry_point_falls_back() {
        let (capability, backend) =
            probe_backend(|| Err::<Fixed, _>(ProbeError::MissingEntryPoint("request".into())));
        assert_eq!(capability, Capability::Unconstrained);
        assert!(!capability.uses_settlement());
        assert!(!backend.is_live());
        assert_eq!(backend.available(VesselId(1), "Power"), 0.0);
    }

    #[test]
    fn test_probe_not_loaded() {
        let (capability, _) = probe_backend(|| Err::<Fixed, _>(ProbeError::NotLoaded));
        assert_eq!(capability, Capability::Unconstrained);
    }

    #[test]
    fn test_probe_error_messages() {
        assert_eq!(
            ProbeError::MissingEntryPoint("amount".into()).to_string(),
            "resource subsystem is missing entry point `amount`"
        );
        assert_eq!(Capability::Advanced.name(), "advanced");
    }
}

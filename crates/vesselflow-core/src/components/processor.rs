//! Processor components - converters mounted on a vessel.

use serde::{Deserialize, Serialize};
use vesselflow_logic::oracle::VesselId;
use vesselflow_logic::processor::ProcessorSpec;

/// A running converter and its timing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Processor {
    pub spec: ProcessorSpec,
    /// Simulation time (seconds) of the last settlement.
    pub last_update: f64,
    /// Throttle factor achieved on the last tick.
    pub last_factor: f64,
    pub enabled: bool,
}

impl Processor {
    pub fn new(spec: ProcessorSpec, now: f64) -> Self {
        Self {
            spec,
            last_update: now,
            last_factor: 1.0,
            enabled: true,
        }
    }

    /// Seconds since the last settlement, advancing the timestamp to `now`.
    /// A timestamp ahead of `now` yields zero.
    pub fn take_elapsed(&mut self, now: f64) -> f64 {
        let elapsed = (now - self.last_update).max(0.0);
        self.last_update = now;
        elapsed
    }
}

/// Which vessel a processor draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mounted {
    pub vessel: VesselId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_elapsed_advances_timestamp() {
        let mut p = Processor::new(ProcessorSpec::new("Fan"), 10.0);
        assert_eq!(p.take_elapsed(12.5), 2.5);
        assert_eq!(p.last_update, 12.5);
        assert_eq!(p.take_elapsed(12.5), 0.0);
    }

    #[test]
    fn test_take_elapsed_never_negative() {
        let mut p = Processor::new(ProcessorSpec::new("Fan"), 10.0);
        assert_eq!(p.take_elapsed(4.0), 0.0);
        assert_eq!(p.last_update, 4.0);
        assert_eq!(p.take_elapsed(5.0), 1.0);
    }
}

//! Generation - procedural creation of vessel fleets

use rand::Rng;
use serde::{Deserialize, Serialize};
use vesselflow_logic::oracle::VesselId;
use vesselflow_logic::processor::ProcessorSpec;

use crate::components::ResourcePool;
use crate::engine::SimulationEngine;

/// Starting range for one resource on generated vessels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRange {
    pub resource: String,
    /// Starting fill level range as a fraction of capacity
    pub min_level: f64,
    pub max_level: f64,
    pub capacity: f64,
}

impl StockRange {
    pub fn new(resource: impl Into<String>, min_level: f64, max_level: f64, capacity: f64) -> Self {
        Self {
            resource: resource.into(),
            min_level,
            max_level,
            capacity,
        }
    }
}

/// Configuration for fleet generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    pub vessel_count: u32,
    pub stocks: Vec<StockRange>,
    /// Mounted on every generated vessel
    pub processors: Vec<ProcessorSpec>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            vessel_count: 4,
            stocks: vec![
                StockRange::new("Power", 0.2, 1.0, 2000.0),
                StockRange::new("Water", 0.0, 0.8, 500.0),
                StockRange::new("Oxygen", 0.1, 0.9, 1000.0),
                StockRange::new("Food", 0.1, 0.5, 800.0),
            ],
            processors: Vec::new(),
        }
    }
}

/// Spawn `config.vessel_count` vessels with randomized starting stocks
pub fn generate_fleet(
    engine: &mut SimulationEngine,
    config: &FleetConfig,
    rng: &mut impl Rng,
) -> Vec<VesselId> {
    let mut ids = Vec::with_capacity(config.vessel_count as usize);

    for i in 0..config.vessel_count {
        let mut pool = ResourcePool::new();
        for range in &config.stocks {
            let (lo, hi) = ordered(range.min_level, range.max_level);
            let level = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
            pool = pool.with(range.resource.as_str(), level * range.capacity, range.capacity);
        }

        let name = format!("{} {}", VESSEL_NAMES[rng.gen_range(0..VESSEL_NAMES.len())], i + 1);
        let id = engine.spawn_vessel(name, pool);
        for spec in &config.processors {
            engine.add_processor(id, spec.clone());
        }
        ids.push(id);
    }

    ids
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    let (a, b) = (a.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

static VESSEL_NAMES: &[&str] = &[
    "Endeavour",
    "Meridian",
    "Kestrel",
    "Halcyon",
    "Tenacity",
    "Perihelion",
    "Wayfarer",
    "Aurora",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subsystem::HostServices;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_fleet() {
        let mut engine = SimulationEngine::new(&HostServices::with_resource_subsystem());
        let config = FleetConfig {
            vessel_count: 3,
            processors: vec![ProcessorSpec::new("Scrubber").input("Power", 1.0)],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);

        let ids = generate_fleet(&mut engine, &config, &mut rng);

        assert_eq!(ids.len(), 3);
        for id in ids {
            let power = engine.stock(id, "Power");
            assert!((400.0..=2000.0).contains(&power), "power {power}");
            assert_eq!(engine.processor_factors(id).len(), 1);
        }
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = FleetConfig::default();
        let levels = |seed| {
            let mut engine = SimulationEngine::new(&HostServices::bare());
            let mut rng = StdRng::seed_from_u64(seed);
            generate_fleet(&mut engine, &config, &mut rng)
                .into_iter()
                .map(|id| engine.stock(id, "Water"))
                .collect::<Vec<f64>>()
        };
        assert_eq!(levels(7), levels(7));
    }

    #[test]
    fn test_ordered_swaps_and_clamps() {
        assert_eq!(ordered(0.9, 0.1), (0.1, 0.9));
        assert_eq!(ordered(-1.0, 2.0), (0.0, 1.0));
    }
}

//! Throttled processing - settles every mounted processor against the
//! resource subsystem once per tick.

use hecs::World;
use vesselflow_logic::oracle::ResourceOracle;
use vesselflow_logic::settlement::Settlement;

use crate::components::{Mounted, Processor};

/// Settle each enabled processor over the time since its last update.
///
/// Returns the number of processors that ran below full capacity.
pub fn processing_system<O: ResourceOracle>(world: &mut World, oracle: &mut O, now: f64) -> usize {
    let mut throttled = 0;

    for (_, (processor, mounted)) in world.query_mut::<(&mut Processor, &Mounted)>() {
        if !processor.enabled {
            continue;
        }
        let elapsed = processor.take_elapsed(now);
        let ledger = processor.spec.ledger();
        let factor = Settlement::new(&ledger)
            .with_producer_policy(processor.spec.producer_policy)
            .execute(&mut *oracle, mounted.vessel, &processor.spec.label, elapsed);

        processor.last_factor = factor;
        if factor < 1.0 {
            throttled += 1;
        }
    }

    throttled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ResourcePool;
    use crate::subsystem::{HostServices, ResourceSubsystem};
    use vesselflow_logic::oracle::VesselId;
    use vesselflow_logic::processor::ProcessorSpec;

    const SHIP: VesselId = VesselId(1);

    fn setup(water: f64) -> (World, ResourceSubsystem) {
        let mut sub = ResourceSubsystem::locate(&HostServices::with_resource_subsystem()).unwrap();
        sub.attach(
            SHIP,
            ResourcePool::new()
                .with("Water", water, 100.0)
                .with("Oxygen", 0.0, 100.0),
        );
        let mut world = World::new();
        let spec = ProcessorSpec::new("Electrolyzer")
            .input("Water", 2.0)
            .output("Oxygen", 1.0);
        world.spawn((Processor::new(spec, 0.0), Mounted { vessel: SHIP }));
        (world, sub)
    }

    #[test]
    fn test_full_supply() {
        let (mut world, mut sub) = setup(100.0);
        let throttled = processing_system(&mut world, &mut sub, 10.0);

        assert_eq!(throttled, 0);
        assert_eq!(sub.available(SHIP, "Water"), 80.0);
        assert_eq!(sub.available(SHIP, "Oxygen"), 10.0);
    }

    #[test]
    fn test_scarce_supply_throttles() {
        let (mut world, mut sub) = setup(5.0);
        let throttled = processing_system(&mut world, &mut sub, 10.0);

        assert_eq!(throttled, 1);
        assert_eq!(sub.available(SHIP, "Water"), 0.0);
        assert!((sub.available(SHIP, "Oxygen") - 2.5).abs() < 1e-9);
        for (_, p) in world.query_mut::<&Processor>() {
            assert!((p.last_factor - 0.25).abs() < 1e-9);
            assert_eq!(p.last_update, 10.0);
        }
    }

    #[test]
    fn test_disabled_processor_skipped() {
        let (mut world, mut sub) = setup(100.0);
        for (_, p) in world.query_mut::<&mut Processor>() {
            p.enabled = false;
        }
        processing_system(&mut world, &mut sub, 10.0);
        assert_eq!(sub.available(SHIP, "Water"), 100.0);
    }
}

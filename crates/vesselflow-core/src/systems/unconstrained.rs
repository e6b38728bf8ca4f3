//! Unconstrained consumption - the fallback when no resource subsystem is
//! loaded. Every request applies in full; storage simply clamps.

use hecs::{Entity, World};
use std::collections::HashMap;
use vesselflow_logic::ledger::RequestLedger;
use vesselflow_logic::oracle::VesselId;

use crate::components::{Mounted, Processor, ResourcePool};

/// Apply every request at its full rate, with no throttling.
pub fn apply_unconstrained(pool: &mut ResourcePool, ledger: &RequestLedger, elapsed_seconds: f64) {
    if elapsed_seconds <= 0.0 {
        return;
    }
    for request in ledger {
        let amount = request.rate * elapsed_seconds;
        if amount > 0.0 {
            pool.draw(&request.name, amount);
        } else {
            pool.fill(&request.name, -amount);
        }
    }
}

/// Run every enabled processor against its vessel's own pool.
pub fn unconstrained_system(world: &mut World, vessels: &HashMap<VesselId, Entity>, now: f64) {
    let mut work = Vec::new();
    for (_, (processor, mounted)) in world.query_mut::<(&mut Processor, &Mounted)>() {
        if !processor.enabled {
            continue;
        }
        let elapsed = processor.take_elapsed(now);
        processor.last_factor = 1.0;
        work.push((mounted.vessel, processor.spec.ledger(), elapsed));
    }

    for (vessel, ledger, elapsed) in work {
        let Some(&entity) = vessels.get(&vessel) else {
            continue;
        };
        if let Ok(mut pool) = world.get::<&mut ResourcePool>(entity) {
            apply_unconstrained(&mut pool, &ledger, elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_throttling() {
        let mut pool = ResourcePool::new()
            .with("Water", 5.0, 100.0)
            .with("Power", 100.0, 100.0)
            .with("Oxygen", 0.0, 100.0);
        let mut ledger = RequestLedger::new();
        ledger
            .consume("Water", 10.0)
            .consume("Power", 5.0)
            .produce("Oxygen", 4.0);

        apply_unconstrained(&mut pool, &ledger, 1.0);

        // Water empties, but power and oxygen still run at full rate
        assert_eq!(pool.amount("Water"), 0.0);
        assert_eq!(pool.amount("Power"), 95.0);
        assert_eq!(pool.amount("Oxygen"), 4.0);
    }

    #[test]
    fn test_clamps_to_capacity() {
        let mut pool = ResourcePool::new().with("Oxygen", 98.0, 100.0);
        let mut ledger = RequestLedger::new();
        ledger.produce("Oxygen", 10.0);
        apply_unconstrained(&mut pool, &ledger, 1.0);
        assert_eq!(pool.amount("Oxygen"), 100.0);
    }

    #[test]
    fn test_zero_elapsed() {
        let mut pool = ResourcePool::new().with("Water", 5.0, 100.0);
        let mut ledger = RequestLedger::new();
        ledger.consume("Water", 10.0);
        apply_unconstrained(&mut pool, &ledger, 0.0);
        assert_eq!(pool.amount("Water"), 5.0);
    }

    #[test]
    fn test_system_uses_vessel_pool() {
        use vesselflow_logic::processor::ProcessorSpec;

        let mut world = World::new();
        let ship = VesselId(4);
        let entity = world.spawn((ResourcePool::new().with("Power", 10.0, 10.0),));
        let mut vessels = HashMap::new();
        vessels.insert(ship, entity);
        world.spawn((
            Processor::new(ProcessorSpec::new("Lamp").input("Power", 1.0), 0.0),
            Mounted { vessel: ship },
        ));

        unconstrained_system(&mut world, &vessels, 3.0);

        let pool = world.get::<&ResourcePool>(entity).unwrap();
        assert_eq!(pool.amount("Power"), 7.0);
    }
}

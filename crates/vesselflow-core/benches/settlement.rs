use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vesselflow_core::components::ResourcePool;
use vesselflow_core::subsystem::{HostServices, ResourceSubsystem};
use vesselflow_logic::ledger::RequestLedger;
use vesselflow_logic::oracle::VesselId;
use vesselflow_logic::settlement::Settlement;

const RESOURCES: [&str; 6] = ["Power", "Water", "Oxygen", "Food", "Coolant", "Fuel"];

fn bench_settlement(c: &mut Criterion) {
    let ship = VesselId(1);
    let mut subsystem = ResourceSubsystem::locate(&HostServices::with_resource_subsystem())
        .expect("full host should bind");
    let mut pool = ResourcePool::new();
    for name in RESOURCES {
        pool = pool.with(name, 1.0e9, 1.0e9);
    }
    subsystem.attach(ship, pool);

    let mut ledger = RequestLedger::new();
    for (i, name) in RESOURCES.iter().enumerate() {
        ledger.consume(*name, 0.1 * (i + 1) as f64);
        ledger.produce(*name, 0.05);
    }

    c.bench_function("settle_12_requests", |b| {
        b.iter(|| {
            let factor = Settlement::new(&ledger).execute(&mut subsystem, ship, "Bench", black_box(0.02));
            subsystem.drain_attribution();
            factor
        })
    });
}

criterion_group!(benches, bench_settlement);
criterion_main!(benches);

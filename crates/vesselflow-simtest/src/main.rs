//! Vesselflow Headless Settlement Harness
//!
//! Validates settlement logic and processor data without a host game.
//! Runs entirely in-process: no rendering, no save files.
//!
//! Usage:
//!   cargo run -p vesselflow-simtest
//!   cargo run -p vesselflow-simtest -- --verbose
//!   cargo run -p vesselflow-simtest -- --json

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use vesselflow_core::generation::{generate_fleet, FleetConfig};
use vesselflow_core::prelude::*;
use vesselflow_logic::capability::Capability;
use vesselflow_logic::ledger::RequestLedger;
use vesselflow_logic::oracle::{ResourceOracle, VesselId};
use vesselflow_logic::processor::ProcessorSpec;
use vesselflow_logic::settlement::{FlowDirection, ProducerPolicy, Settlement};

// ── Processor definitions (same JSON the host loads) ────────────────────
const PROCESSORS_JSON: &str = include_str!("../../../data/processors.json");

const SEED: u64 = 0x5eed;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Serialize)]
struct Report {
    passed: usize,
    failed: usize,
    results: Vec<TestResult>,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    if !json {
        println!("=== Vesselflow Settlement Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Processor definitions
    let specs = match ProcessorSpec::parse_list(PROCESSORS_JSON) {
        Ok(specs) => {
            results.push(TestResult::new(
                "processors_parse",
                !specs.is_empty(),
                format!("{} processor definitions loaded", specs.len()),
            ));
            specs
        }
        Err(e) => {
            results.push(TestResult::new("processors_parse", false, e.to_string()));
            Vec::new()
        }
    };

    // 2. Settlement properties on a scripted oracle
    results.extend(validate_settlement_properties(json));

    // 3. Fleet run under both resource models
    results.extend(validate_fleet(&specs, verbose && !json));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if json {
        let report = Report {
            passed,
            failed,
            results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("failed to encode report: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            passed + failed,
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 2. Settlement properties ────────────────────────────────────────────

/// Fixed availability, mutations only counted.
#[derive(Default)]
struct Scripted {
    stock: HashMap<String, f64>,
    mutations: usize,
}

impl Scripted {
    fn with(stock: &[(&str, f64)]) -> Self {
        Self {
            stock: stock.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            mutations: 0,
        }
    }
}

impl ResourceOracle for Scripted {
    fn available(&self, _vessel: VesselId, resource: &str) -> f64 {
        self.stock.get(resource).copied().unwrap_or(0.0)
    }

    fn consume(&mut self, _vessel: VesselId, _resource: &str, _amount: f64, _label: &str) {
        self.mutations += 1;
    }

    fn produce(&mut self, _vessel: VesselId, _resource: &str, _amount: f64, _label: &str) {
        self.mutations += 1;
    }
}

fn validate_settlement_properties(quiet: bool) -> Vec<TestResult> {
    if !quiet {
        println!("--- Settlement Properties ---");
    }
    let ship = VesselId(1);
    let mut results = Vec::new();

    // No scarcity
    let mut ledger = RequestLedger::new();
    ledger.consume("Power", 3.0).consume("Water", 1.0);
    let mut oracle = Scripted::with(&[("Power", 1e6), ("Water", 1e6)]);
    let outcome = Settlement::new(&ledger).execute_detailed(&mut oracle, ship, "Plenty", 2.0);
    results.push(TestResult::new(
        "settle_no_scarcity",
        outcome.factor == 1.0 && outcome.total("Power", FlowDirection::Consumed) == 6.0,
        format!("factor={:.3}", outcome.factor),
    ));

    // Proportional fairness
    let mut ledger = RequestLedger::new();
    ledger.consume("A", 10.0).consume("B", 5.0);
    let mut oracle = Scripted::with(&[("A", 5.0), ("B", 100.0)]);
    let outcome = Settlement::new(&ledger).execute_detailed(&mut oracle, ship, "Fair", 1.0);
    let a = outcome.total("A", FlowDirection::Consumed);
    let b = outcome.total("B", FlowDirection::Consumed);
    results.push(TestResult::new(
        "settle_proportional",
        outcome.factor == 0.5 && a == 5.0 && b == 2.5,
        format!("factor={:.3} A={} B={}", outcome.factor, a, b),
    ));

    // Unthrottled producers
    let mut ledger = RequestLedger::new();
    ledger.consume("A", 10.0).produce("C", 3.0);
    let mut oracle = Scripted::with(&[("A", 1.0)]);
    let outcome = Settlement::new(&ledger)
        .with_producer_policy(ProducerPolicy::Unthrottled)
        .execute_detailed(&mut oracle, ship, "Beacon", 1.0);
    let c = outcome.total("C", FlowDirection::Produced);
    results.push(TestResult::new(
        "settle_unthrottled_producer",
        c == 3.0,
        format!("factor={:.3} produced={}", outcome.factor, c),
    ));

    // Zero duration
    let mut ledger = RequestLedger::new();
    ledger.consume("A", 1.0).produce("B", 1.0);
    let mut oracle = Scripted::default();
    let factor = Settlement::new(&ledger).execute(&mut oracle, ship, "Frozen", 0.0);
    results.push(TestResult::new(
        "settle_zero_duration",
        factor == 1.0 && oracle.mutations == 2,
        format!("factor={:.3} mutations={}", factor, oracle.mutations),
    ));

    // Empty ledger
    let ledger = RequestLedger::new();
    let mut oracle = Scripted::default();
    let factor = Settlement::new(&ledger).execute(&mut oracle, ship, "Empty", 1.0);
    results.push(TestResult::new(
        "settle_empty_ledger",
        factor == 1.0 && oracle.mutations == 0,
        format!("factor={:.3}", factor),
    ));

    // Unknown resource
    let mut ledger = RequestLedger::new();
    ledger.consume("Unobtainium", 1.0);
    let mut oracle = Scripted::default();
    let factor = Settlement::new(&ledger).execute(&mut oracle, ship, "Mystery", 1.0);
    results.push(TestResult::new(
        "settle_unknown_resource",
        factor == 0.0,
        format!("factor={:.3}", factor),
    ));

    results
}

// ── 3. Fleet run ────────────────────────────────────────────────────────

fn validate_fleet(specs: &[ProcessorSpec], verbose: bool) -> Vec<TestResult> {
    if verbose {
        println!("--- Fleet Run ---");
    }
    let mut results = Vec::new();
    let config = FleetConfig {
        vessel_count: 6,
        processors: specs.to_vec(),
        ..Default::default()
    };

    for (host, expected) in [
        (HostServices::with_resource_subsystem(), Capability::Advanced),
        (HostServices::bare(), Capability::Unconstrained),
    ] {
        let mut engine = SimulationEngine::new(&host);
        let mut rng = StdRng::seed_from_u64(SEED);
        let fleet = generate_fleet(&mut engine, &config, &mut rng);
        let tag = expected.name();

        results.push(TestResult::new(
            &format!("fleet_{}_capability", tag),
            engine.capability() == expected,
            format!("probe selected {}", engine.capability().name()),
        ));

        let mut negative = 0;
        let mut out_of_range = 0;
        let mut throttled_ticks = 0;
        for _ in 0..3600 {
            engine.update(1.0);
            for &id in &fleet {
                for resource in ["Power", "Water", "Oxygen", "Food"] {
                    if engine.stock(id, resource) < 0.0 {
                        negative += 1;
                    }
                }
                for (_, factor) in engine.processor_factors(id) {
                    if !(0.0..=1.0).contains(&factor) {
                        out_of_range += 1;
                    }
                    if factor < 1.0 {
                        throttled_ticks += 1;
                    }
                }
            }
            engine.drain_attribution();
        }

        results.push(TestResult::new(
            &format!("fleet_{}_no_negative_stock", tag),
            negative == 0,
            format!("{} negative readings over 1h", negative),
        ));
        results.push(TestResult::new(
            &format!("fleet_{}_factor_range", tag),
            out_of_range == 0,
            format!("{} throttled processor-ticks", throttled_ticks),
        ));

        if verbose {
            for &id in &fleet {
                println!(
                    "  {} [{}]: power={:.1} water={:.1} oxygen={:.1} food={:.1}",
                    id,
                    tag,
                    engine.stock(id, "Power"),
                    engine.stock(id, "Water"),
                    engine.stock(id, "Oxygen"),
                    engine.stock(id, "Food"),
                );
            }
        }
    }

    results
}

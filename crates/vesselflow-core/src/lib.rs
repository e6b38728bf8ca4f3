//! Vesselflow Core - vessel resource host
//!
//! An ECS-based host for the throttled settlement logic in `vesselflow-logic`.
//! It owns the simulated clock, the vessels and the converters mounted on
//! them, and decides once at startup which resource model is in effect.
//!
//! # Architecture
//!
//! - **Entities**: vessels and the processors mounted on them (`hecs`)
//! - **Subsystem**: scarcity-aware per-vessel stocks, used when the host
//!   exposes it; otherwise stocks live on the vessel entity and the
//!   unconstrained fallback runs instead
//! - **Snapshots**: key/value state for vessels that are parked
//!
//! # Example
//!
//! ```rust,no_run
//! use vesselflow_core::prelude::*;
//! use vesselflow_logic::processor::ProcessorSpec;
//!
//! let mut engine = SimulationEngine::new(&HostServices::with_resource_subsystem());
//! let ship = engine.spawn_vessel("Ark", ResourcePool::new().with("Power", 100.0, 100.0));
//! engine.add_processor(ship, ProcessorSpec::new("Lights").input("Power", 0.5));
//!
//! loop {
//!     engine.update(1.0 / 60.0);
//! }
//! ```

pub mod components;
pub mod engine;
pub mod generation;
pub mod snapshot;
pub mod subsystem;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::SimulationEngine;
    pub use crate::subsystem::HostServices;
}

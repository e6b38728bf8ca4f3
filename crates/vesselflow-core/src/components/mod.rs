//! Component definitions for the ECS host.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod processor;
mod vessel;

pub use processor::*;
pub use vessel::*;

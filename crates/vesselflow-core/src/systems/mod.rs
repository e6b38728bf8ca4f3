//! Systems - logic that operates on components

mod processing;
mod unconstrained;

pub use processing::*;
pub use unconstrained::*;

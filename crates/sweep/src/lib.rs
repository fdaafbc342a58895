//! Sweep façade crate: runs launch-angle sweeps and aggregates their results.

pub mod aggregate;
pub mod document;
pub mod sweep;

pub use facade::*;
pub use sweep_engine as engine;

mod facade;

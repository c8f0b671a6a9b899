//! Simulation helpers.

pub mod simulate;

pub use simulate::*;

//! `effort-forecast` library crate.
//!
//! The binary (`ef`) is a thin wrapper around this library so that:
//!
//! - the forecasting core is testable without spawning processes
//! - the core stays free of I/O; front-ends (CLI, prompt, exports) call into it

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

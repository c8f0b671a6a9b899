//! Input/output helpers.
//!
//! - task CSV ingest + validation (`ingest`)
//! - historical planned/actual pairs (`history`)
//! - per-task CSV export (`export`)
//! - results JSON read/write (`results`)

pub mod export;
pub mod history;
pub mod ingest;
pub mod results;

pub use export::*;
pub use history::*;
pub use ingest::*;
pub use results::*;

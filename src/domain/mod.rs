//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - forecast inputs (`EstimationInput`, `TaskInput`, `Deadline`)
//! - run configuration (`VolatilitySource`, `EstimatorKind`, `CdfKind`, `RunConfig`)
//! - per-task and aggregate outputs (`TaskRiskReport`, `RiskSummary`, `ResultsFile`)

pub mod types;

pub use types::*;

//! Read/write results JSON files.
//!
//! The JSON file is the portable record of a batch run: the run settings,
//! every task report and the aggregate summary. The schema is
//! `domain::ResultsFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{ResultsFile, RiskSummary, RunConfig, TaskRiskReport};
use crate::error::AppError;

pub fn build_results_file(reports: &[TaskRiskReport], summary: &RiskSummary, config: &RunConfig) -> ResultsFile {
    ResultsFile {
        tool: "ef".to_string(),
        generated_at: Utc::now(),
        risk_free_rate: config.risk_free_rate,
        volatility: config.volatility,
        cdf: config.cdf,
        reports: reports.to_vec(),
        summary: summary.clone(),
    }
}

/// Write a results JSON file.
pub fn write_results_json(path: &Path, results: &ResultsFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create results JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, results)
        .map_err(|e| AppError::new(4, format!("Failed to write results JSON: {e}")))?;
    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))
}

//! Export per-task results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::TaskRiskReport;
use crate::error::AppError;

const HEADER: &str = "name,current_estimate,target_effort,time_to_deadline,volatility,risk_free_rate,forecast,status,overshoot_or_buffer,percent";

/// Write per-task results to a CSV file.
pub fn write_results_csv(path: &Path, reports: &[TaskRiskReport]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, reports)
}

pub fn write_results<W: Write>(out: W, reports: &[TaskRiskReport]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer
        .write_record(HEADER.split(','))
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for r in reports {
        let status = match r.status {
            crate::models::RiskStatus::OnTrack => "on_track",
            crate::models::RiskStatus::AtRisk => "at_risk",
        };
        let row = [
            r.name.clone(),
            format!("{:.4}", r.input.current_estimate),
            format!("{:.4}", r.input.target_effort),
            format!("{:.6}", r.input.time_to_deadline),
            format!("{:.6}", r.input.volatility),
            format!("{:.6}", r.input.risk_free_rate),
            format!("{:.4}", r.forecast),
            status.to_string(),
            format!("{:.4}", r.overshoot_or_buffer),
            format!("{:.4}", r.overshoot_or_buffer_percent),
        ];
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

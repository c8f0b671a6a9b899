//! Shared forecast pipeline used by the batch, single-task and interactive front-ends.
//!
//! tasks -> volatility resolution -> forecast + classify (parallel) -> summary
//!
//! The front-ends only differ in how they collect tasks and how they print.

use log::{debug, info};
use rayon::prelude::*;

use crate::domain::{
    EstimationInput, EstimatorKind, RiskSummary, RunConfig, TaskInput, TaskRiskReport, VolatilitySource,
};
use crate::error::{AppError, EstimationError};
use crate::io::HistoricalObservations;
use crate::report::{assess_task, summarize};

/// All computed outputs of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub reports: Vec<TaskRiskReport>,
    pub summary: RiskSummary,
}

/// Decide where task volatilities come from.
///
/// History wins over everything else; its estimate is floored at
/// `HISTORY_VOLATILITY_FLOOR`. Otherwise `per_task` selects per-task values
/// with `common` as fallback.
pub fn resolve_volatility_source(
    common: f64,
    per_task: bool,
    history: Option<&HistoricalObservations>,
    estimator: EstimatorKind,
) -> Result<VolatilitySource, EstimationError> {
    if let Some(history) = history {
        let sigma = history.floored_volatility(estimator)?;
        info!("historical volatility {sigma:.4} from {} pair(s)", history.len());
        return Ok(VolatilitySource::History {
            sigma,
            observations: history.len(),
        });
    }
    if per_task {
        return Ok(VolatilitySource::PerTask { fallback: common });
    }
    Ok(VolatilitySource::Common { sigma: common })
}

/// Resolve a task into the forecaster's inputs.
pub fn estimation_input(task: &TaskInput, source: &VolatilitySource, risk_free_rate: f64) -> EstimationInput {
    EstimationInput {
        current_estimate: task.current_estimate,
        target_effort: task.target_effort,
        time_to_deadline: task.time_to_deadline,
        volatility: source.sigma_for(task),
        risk_free_rate,
    }
}

/// Reject tasks the forecaster cannot handle (it does not validate S and K).
pub fn validate_task(task: &TaskInput) -> Result<(), AppError> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !positive(task.current_estimate) {
        return Err(AppError::new(2, format!("Task '{}': current estimate must be > 0.", task.name)));
    }
    if !positive(task.target_effort) {
        return Err(AppError::new(2, format!("Task '{}': target effort must be > 0.", task.name)));
    }
    if !task.time_to_deadline.is_finite() {
        return Err(AppError::new(2, format!("Task '{}': deadline is not a number.", task.name)));
    }
    if let Some(sigma) = task.volatility {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(AppError::new(2, format!("Task '{}': volatility must be >= 0.", task.name)));
        }
    }
    Ok(())
}

/// Forecast and classify every task.
///
/// Tasks are independent, so they are assessed in parallel; output order
/// matches input order.
pub fn run_batch(tasks: &[TaskInput], config: &RunConfig) -> Result<BatchOutput, AppError> {
    for task in tasks {
        validate_task(task)?;
    }

    let reports: Vec<TaskRiskReport> = tasks
        .par_iter()
        .map(|task| {
            let input = estimation_input(task, &config.volatility, config.risk_free_rate);
            assess_task(&task.name, input, config.cdf)
        })
        .collect();

    if let Some(bad) = reports.iter().find(|r| !r.forecast.is_finite()) {
        return Err(AppError::new(4, format!("Non-finite forecast for task '{}'.", bad.name)));
    }

    let summary = summarize(&reports);
    debug!(
        "assessed {} task(s): {} at risk, {} on track",
        summary.total, summary.at_risk, summary.on_track
    );

    Ok(BatchOutput { reports, summary })
}

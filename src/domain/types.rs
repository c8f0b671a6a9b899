//! Shared domain types.
//!
//! Everything here is a value object: built from user input, passed through
//! the pipeline, and (for results) serialized to CSV/JSON.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::EstimationError;
use crate::math::{ErfCdf, LogRatio, RelativeDeviation, VolatilityEstimator, ZelenSevero};
use crate::models::{EffortForecaster, RiskStatus};

/// Days per year used to turn day counts and due dates into `T` (Act/365.25).
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Floor applied to volatilities estimated from history.
pub const HISTORY_VOLATILITY_FLOOR: f64 = 0.01;

/// Fully resolved inputs of one forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimationInput {
    /// `S`: current effort estimate (hours).
    pub current_estimate: f64,
    /// `K`: target effort / budget (hours).
    pub target_effort: f64,
    /// `T`: time to deadline (years).
    pub time_to_deadline: f64,
    /// `σ`: volatility (unitless).
    pub volatility: f64,
    /// `r`: risk-free rate (unitless).
    pub risk_free_rate: f64,
}

/// One task as entered by the user, before volatility is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub name: String,
    pub current_estimate: f64,
    pub target_effort: f64,
    /// Years.
    pub time_to_deadline: f64,
    /// Per-task volatility, if the user supplied one.
    pub volatility: Option<f64>,
}

/// How a task's deadline was expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deadline {
    Years(f64),
    Days(f64),
    Due { date: NaiveDate, asof: NaiveDate },
}

impl Deadline {
    /// Convert to years. Due dates in the past give a negative horizon.
    pub fn years(self) -> f64 {
        match self {
            Deadline::Years(y) => y,
            Deadline::Days(d) => d / DAYS_PER_YEAR,
            Deadline::Due { date, asof } => (date - asof).num_days() as f64 / DAYS_PER_YEAR,
        }
    }
}

/// Where each task's volatility comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VolatilitySource {
    /// One volatility for every task.
    Common { sigma: f64 },
    /// Each task's own volatility; tasks without one use `fallback`.
    PerTask { fallback: f64 },
    /// Estimated from historical planned/actual pairs (already floored).
    History { sigma: f64, observations: usize },
}

impl VolatilitySource {
    /// Volatility for a task under this source.
    pub fn sigma_for(&self, task: &TaskInput) -> f64 {
        match *self {
            VolatilitySource::Common { sigma } => sigma,
            VolatilitySource::PerTask { fallback } => task.volatility.unwrap_or(fallback),
            VolatilitySource::History { sigma, .. } => sigma,
        }
    }

    pub fn describe(&self) -> String {
        match *self {
            VolatilitySource::Common { sigma } => format!("common σ={sigma:.4}"),
            VolatilitySource::PerTask { fallback } => format!("per-task (fallback σ={fallback:.4})"),
            VolatilitySource::History { sigma, observations } => {
                format!("historical σ={sigma:.4} from {observations} pair(s)")
            }
        }
    }
}

/// Which volatility estimator to run on historical pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EstimatorKind {
    /// Relative deviation `(actual - planned) / planned`.
    Relative,
    /// Log ratio `ln(actual / planned)`.
    LogRatio,
}

impl EstimatorKind {
    pub fn estimate(self, planned: &[f64], actual: &[f64]) -> Result<f64, EstimationError> {
        match self {
            EstimatorKind::Relative => RelativeDeviation.estimate(planned, actual),
            EstimatorKind::LogRatio => LogRatio.estimate(planned, actual),
        }
    }
}

/// Which normal CDF approximation the forecaster uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CdfKind {
    /// Zelen & Severo polynomial (A&S 26.2.17).
    ZelenSevero,
    /// Error-function based (A&S 7.1.26).
    Erf,
}

impl CdfKind {
    pub fn forecast(self, input: &EstimationInput) -> f64 {
        match self {
            CdfKind::ZelenSevero => EffortForecaster::new(ZelenSevero).forecast_input(input),
            CdfKind::Erf => EffortForecaster::new(ErfCdf).forecast_input(input),
        }
    }
}

/// Per-task forecast and risk metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRiskReport {
    pub name: String,
    pub input: EstimationInput,
    pub forecast: f64,
    pub status: RiskStatus,
    /// Overshoot (at risk) or buffer (on track), hours.
    pub overshoot_or_buffer: f64,
    pub overshoot_or_buffer_percent: f64,
}

impl TaskRiskReport {
    pub fn target(&self) -> f64 {
        self.input.target_effort
    }
}

/// Aggregate view over a batch of task reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub total: usize,
    pub on_track: usize,
    pub at_risk: usize,
    pub on_track_percent: f64,
    pub at_risk_percent: f64,
    pub total_forecast: f64,
    pub total_target: f64,
    pub total_overshoot: f64,
    pub total_buffer: f64,
}

/// A full run's configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub risk_free_rate: f64,
    pub volatility: VolatilitySource,
    pub cdf: CdfKind,
    pub plot: bool,
    pub plot_width: usize,
    pub export_results: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}

/// A saved results file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub risk_free_rate: f64,
    pub volatility: VolatilitySource,
    pub cdf: CdfKind,
    pub reports: Vec<TaskRiskReport>,
    pub summary: RiskSummary,
}

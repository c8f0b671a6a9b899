//! Risk classification of a forecast against its target.

use serde::{Deserialize, Serialize};

/// Whether a task's forecast stays under its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    OnTrack,
    AtRisk,
}

impl RiskStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            RiskStatus::OnTrack => "on track",
            RiskStatus::AtRisk => "AT RISK",
        }
    }

    /// Label for the signed magnitude column.
    pub fn magnitude_label(self) -> &'static str {
        match self {
            RiskStatus::OnTrack => "buffer",
            RiskStatus::AtRisk => "overshoot",
        }
    }
}

/// Classification of one forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub status: RiskStatus,
    /// Overshoot (at risk) or buffer (on track) in hours, never negative.
    pub magnitude: f64,
    /// `magnitude` as a percentage of the target.
    pub percent: f64,
}

/// Classify `forecast` against `target`.
///
/// Reaching the target counts as at risk. `target` must be positive.
pub fn classify_risk(forecast: f64, target: f64) -> RiskAssessment {
    let (status, magnitude) = if forecast >= target {
        (RiskStatus::AtRisk, forecast - target)
    } else {
        (RiskStatus::OnTrack, target - forecast)
    };
    RiskAssessment {
        status,
        magnitude,
        percent: magnitude * 100.0 / target,
    }
}

//! Reporting utilities: task assessment, aggregation, and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/forecast code stays clean and testable
//! - output changes are localized

use crate::domain::{CdfKind, EstimationInput, RiskSummary, TaskRiskReport};
use crate::models::{RiskStatus, classify_risk};

pub mod format;

pub use format::*;

/// Forecast one task and classify it against its target.
pub fn assess_task(name: &str, input: EstimationInput, cdf: CdfKind) -> TaskRiskReport {
    let forecast = cdf.forecast(&input);
    let risk = classify_risk(forecast, input.target_effort);
    TaskRiskReport {
        name: name.to_string(),
        input,
        forecast,
        status: risk.status,
        overshoot_or_buffer: risk.magnitude,
        overshoot_or_buffer_percent: risk.percent,
    }
}

/// Aggregate counts and totals over a batch of reports.
pub fn summarize(reports: &[TaskRiskReport]) -> RiskSummary {
    let total = reports.len();
    let at_risk = reports.iter().filter(|r| r.status == RiskStatus::AtRisk).count();
    let on_track = total - at_risk;

    let share = |n: usize| if total == 0 { 0.0 } else { n as f64 * 100.0 / total as f64 };

    let magnitude_sum = |status: RiskStatus| -> f64 {
        reports
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.overshoot_or_buffer)
            .sum()
    };

    RiskSummary {
        total,
        on_track,
        at_risk,
        on_track_percent: share(on_track),
        at_risk_percent: share(at_risk),
        total_forecast: reports.iter().map(|r| r.forecast).sum(),
        total_target: reports.iter().map(|r| r.target()).sum(),
        total_overshoot: magnitude_sum(RiskStatus::AtRisk),
        total_buffer: magnitude_sum(RiskStatus::OnTrack),
    }
}

/// At-risk tasks, worst (largest relative overshoot) first.
pub fn rank_at_risk(reports: &[TaskRiskReport]) -> Vec<TaskRiskReport> {
    let mut at_risk: Vec<TaskRiskReport> = reports
        .iter()
        .filter(|r| r.status == RiskStatus::AtRisk)
        .cloned()
        .collect();
    at_risk.sort_by(|a, b| {
        b.overshoot_or_buffer_percent
            .partial_cmp(&a.overshoot_or_buffer_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    at_risk
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn report(name: &str, forecast: f64, target: f64) -> TaskRiskReport {
        let risk = classify_risk(forecast, target);
        TaskRiskReport {
            name: name.to_string(),
            input: EstimationInput {
                current_estimate: forecast,
                target_effort: target,
                time_to_deadline: 0.5,
                volatility: 0.225,
                risk_free_rate: 0.05,
            },
            forecast,
            status: risk.status,
            overshoot_or_buffer: risk.magnitude,
            overshoot_or_buffer_percent: risk.percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::report;
    use super::*;

    #[test]
    fn assess_task_combines_forecast_and_classification() {
        let input = EstimationInput {
            current_estimate: 100.0,
            target_effort: 100.0,
            time_to_deadline: 1.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
        };
        let r = assess_task("core", input, CdfKind::ZelenSevero);
        assert!((r.forecast - 10.4506).abs() < 1e-3);
        assert_eq!(r.status, RiskStatus::OnTrack);
        assert!((r.overshoot_or_buffer - (100.0 - r.forecast)).abs() < 1e-12);
    }

    #[test]
    fn summarize_counts_and_totals() {
        let reports = vec![
            report("a", 54.3, 60.0),
            report("b", 42.8, 35.0),
            report("c", 10.0, 10.0),
            report("d", 5.0, 8.0),
        ];
        let s = summarize(&reports);
        assert_eq!(s.total, 4);
        assert_eq!(s.at_risk, 2);
        assert_eq!(s.on_track, 2);
        assert_eq!(s.at_risk_percent, 50.0);
        assert!((s.total_overshoot - 7.8).abs() < 1e-9);
        assert!((s.total_buffer - 8.7).abs() < 1e-9);
        assert!((s.total_target - 113.0).abs() < 1e-9);
    }

    #[test]
    fn summarize_empty_batch() {
        let s = summarize(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.at_risk_percent, 0.0);
        assert_eq!(s.on_track_percent, 0.0);
    }

    #[test]
    fn rank_at_risk_orders_by_relative_overshoot() {
        let reports = vec![
            report("small", 11.0, 10.0),
            report("fine", 5.0, 10.0),
            report("big", 15.0, 10.0),
        ];
        let ranked = rank_at_risk(&reports);
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["big", "small"]);
    }
}

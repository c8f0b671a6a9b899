//! Text rendering of forecasts: run header, summary table, risk breakdown.

use crate::domain::{RiskSummary, RunConfig, TaskRiskReport};
use crate::models::RiskStatus;

use super::rank_at_risk;

/// Static advice printed for every at-risk task.
pub const RECOMMENDATIONS: [&str; 4] = [
    "Re-check the scope and split the task if it can be delivered in parts.",
    "Move the deadline or raise the budget before work continues.",
    "Add capacity or pair on the riskiest parts.",
    "Re-estimate once the main unknowns are resolved.",
];

/// Header describing the run settings.
pub fn format_run_header(config: &RunConfig, task_count: usize) -> String {
    let mut out = String::new();
    out.push_str("=== ef - Effort Forecast ===\n");
    out.push_str(&format!("Tasks: {task_count}\n"));
    out.push_str(&format!("Risk-free rate: {:.4}\n", config.risk_free_rate));
    out.push_str(&format!("Volatility: {}\n", config.volatility.describe()));
    out.push_str(&format!("Normal CDF: {:?}\n", config.cdf));
    out.push('\n');
    out
}

/// One task, in detail (used by `ef forecast`).
pub fn format_task_report(report: &TaskRiskReport) -> String {
    let input = &report.input;
    let mut out = String::new();
    out.push_str(&format!("Task: {}\n", report.name));
    out.push_str(&format!(
        "- current estimate S: {:.2}h | target K: {:.2}h\n",
        input.current_estimate, input.target_effort
    ));
    out.push_str(&format!(
        "- deadline T: {:.4}y ({:.1} days) | volatility σ: {:.4} | rate r: {:.4}\n",
        input.time_to_deadline,
        input.time_to_deadline * crate::domain::DAYS_PER_YEAR,
        input.volatility,
        input.risk_free_rate
    ));
    out.push_str(&format!("- forecast: {:.2}h\n", report.forecast));
    out.push_str(&format!(
        "- status: {} ({} {:.2}h, {:.1}%)\n",
        report.status.display_name(),
        report.status.magnitude_label(),
        report.overshoot_or_buffer,
        report.overshoot_or_buffer_percent
    ));
    if report.status == RiskStatus::AtRisk {
        out.push_str(&format_recommendations());
    }
    out
}

/// The per-task summary table.
pub fn format_summary_table(reports: &[TaskRiskReport]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<20} {:>9} {:>9} {:>7} {:>7} {:>9} {:<8} {:>10} {:>7}",
            "task", "current", "target", "T(y)", "sigma", "forecast", "status", "+/- hours", "%"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<20} {:-<9} {:-<9} {:-<7} {:-<7} {:-<9} {:-<8} {:-<10} {:-<7}",
            "", "", "", "", "", "", "", "", ""
        ),
    );

    for r in reports {
        let signed = match r.status {
            RiskStatus::AtRisk => r.overshoot_or_buffer,
            RiskStatus::OnTrack => -r.overshoot_or_buffer,
        };
        push_line(
            &mut out,
            format!(
                "{:<20} {:>9.2} {:>9.2} {:>7.3} {:>7.3} {:>9.2} {:<8} {:>+10.2} {:>7.1}",
                truncate(&r.name, 20),
                r.input.current_estimate,
                r.input.target_effort,
                r.input.time_to_deadline,
                r.input.volatility,
                r.forecast,
                short_status(r.status),
                signed,
                r.overshoot_or_buffer_percent,
            ),
        );
    }

    out
}

/// Counts, totals and the at-risk list with recommendations.
pub fn format_risk_breakdown(summary: &RiskSummary, reports: &[TaskRiskReport]) -> String {
    let mut out = String::new();
    out.push_str("Risk breakdown:\n");
    out.push_str(&format!(
        "- on track: {} of {} ({:.1}%)\n",
        summary.on_track, summary.total, summary.on_track_percent
    ));
    out.push_str(&format!(
        "- at risk : {} of {} ({:.1}%)\n",
        summary.at_risk, summary.total, summary.at_risk_percent
    ));
    out.push_str(&format!(
        "- total forecast {:.2}h vs total target {:.2}h\n",
        summary.total_forecast, summary.total_target
    ));
    out.push_str(&format!(
        "- total overshoot {:.2}h | total buffer {:.2}h\n",
        summary.total_overshoot, summary.total_buffer
    ));

    let at_risk = rank_at_risk(reports);
    if at_risk.is_empty() {
        out.push_str("\nAll tasks are on track.\n");
        return out;
    }

    out.push_str("\nAt-risk tasks (worst first):\n");
    for r in &at_risk {
        out.push_str(&format!(
            "- {}: overshoot {:.2}h ({:.1}% over a {:.2}h target)\n",
            r.name, r.overshoot_or_buffer, r.overshoot_or_buffer_percent, r.target()
        ));
    }
    out.push('\n');
    out.push_str(&format_recommendations());
    out
}

fn format_recommendations() -> String {
    let mut out = String::from("Recommendations:\n");
    for line in RECOMMENDATIONS {
        out.push_str(&format!("  * {line}\n"));
    }
    out
}

fn short_status(status: RiskStatus) -> &'static str {
    match status {
        RiskStatus::OnTrack => "ok",
        RiskStatus::AtRisk => "RISK",
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::report;
    use crate::report::summarize;

    #[test]
    fn table_has_one_row_per_task() {
        let reports = vec![report("api", 54.3, 60.0), report("ui", 42.8, 35.0)];
        let table = format_summary_table(&reports);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("api"));
        assert!(lines[2].contains("-5.70"));
        assert!(lines[3].contains("RISK"));
        assert!(lines[3].contains("+7.80"));
        assert!(lines[3].contains("22.3"));
    }

    #[test]
    fn breakdown_lists_at_risk_tasks_and_advice() {
        let reports = vec![report("api", 54.3, 60.0), report("ui", 42.8, 35.0)];
        let text = format_risk_breakdown(&summarize(&reports), &reports);
        assert!(text.contains("at risk : 1 of 2 (50.0%)"));
        assert!(text.contains("- ui: overshoot 7.80h (22.3% over a 35.00h target)"));
        assert!(text.contains(RECOMMENDATIONS[0]));
    }

    #[test]
    fn breakdown_without_risk_has_no_advice() {
        let reports = vec![report("api", 54.3, 60.0)];
        let text = format_risk_breakdown(&summarize(&reports), &reports);
        assert!(text.contains("All tasks are on track."));
        assert!(!text.contains("Recommendations"));
    }

    #[test]
    fn single_task_report_mentions_buffer() {
        let text = format_task_report(&report("api", 54.3, 60.0));
        assert!(text.contains("status: on track (buffer 5.70h, 9.5%)"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}

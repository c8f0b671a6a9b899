//! ASCII bar chart of forecast vs target per task.
//!
//! This is intentionally "dumb" (fixed width, one row per task), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (easy to assert on in tests)
//!
//! Chart elements:
//! - forecast bar: `#` (on track) or `!` (at risk, beyond the target)
//! - target marker: `|`

use crate::domain::TaskRiskReport;
use crate::models::RiskStatus;
use crate::report::truncate;

const LABEL_WIDTH: usize = 14;

/// Render one bar per task, all scaled to the largest forecast/target.
pub fn render_forecast_chart(reports: &[TaskRiskReport], width: usize) -> String {
    let width = width.max(10);
    let scale_max = reports
        .iter()
        .flat_map(|r| [r.forecast, r.target()])
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    if reports.is_empty() || scale_max <= 0.0 {
        out.push_str("(nothing to plot)\n");
        return out;
    }

    for r in reports {
        let bar = render_bar(r, scale_max, width);
        out.push_str(&format!(
            "{:<LABEL_WIDTH$} {} {:.1}/{:.1}h\n",
            truncate(&r.name, LABEL_WIDTH),
            bar,
            r.forecast,
            r.target()
        ));
    }
    out.push_str(&format!(
        "{:<LABEL_WIDTH$} scale: {} cols = {:.1}h | '|' target, '!' beyond target\n",
        "", width, scale_max
    ));
    out
}

fn render_bar(report: &TaskRiskReport, scale_max: f64, width: usize) -> String {
    let to_col = |v: f64| -> usize {
        if !v.is_finite() || v <= 0.0 {
            return 0;
        }
        ((v / scale_max) * width as f64).round().clamp(0.0, width as f64) as usize
    };

    let filled = to_col(report.forecast);
    // The target marker sits on the last column of the target's span.
    let target_col = to_col(report.target()).clamp(1, width) - 1;

    let mut cells = vec![' '; width];
    for (i, cell) in cells.iter_mut().enumerate().take(filled) {
        *cell = if report.status == RiskStatus::AtRisk && i > target_col {
            '!'
        } else {
            '#'
        };
    }
    cells[target_col] = '|';

    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(cells);
    bar.push(']');
    bar
}

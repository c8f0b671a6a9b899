//! Command-line parsing for the effort forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the forecasting math.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{CdfKind, Deadline, EstimatorKind};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ef", version, about = "Option-style effort forecasting for project tasks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast and classify a single task.
    Forecast(ForecastArgs),
    /// Forecast every task of a CSV file and print a risk summary.
    Batch(BatchArgs),
    /// Estimate volatility from a history CSV of planned/actual efforts.
    Volatility(VolatilityArgs),
    /// Enter tasks interactively (the default when no subcommand is given).
    Interactive(InteractiveArgs),
    /// Cross-check the closed-form forecast with a Monte Carlo simulation.
    Simulate(SimulateArgs),
}

/// Options shared by every forecasting command.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Risk-free rate r (default: EF_RISK_FREE_RATE or 0.05).
    #[arg(short = 'r', long)]
    pub rate: Option<f64>,

    /// Volatility σ (default: EF_VOLATILITY or 0.3).
    #[arg(short = 'v', long)]
    pub volatility: Option<f64>,

    /// Normal CDF approximation.
    #[arg(long, value_enum, default_value_t = CdfKind::ZelenSevero)]
    pub cdf: CdfKind,
}

/// How far away the deadline is (exactly one).
#[derive(Debug, Args, Clone)]
#[group(required = true, multiple = false)]
pub struct DeadlineArgs {
    /// Time to deadline in years.
    #[arg(long)]
    pub years: Option<f64>,

    /// Time to deadline in days (converted with 365.25 days per year).
    #[arg(long)]
    pub days: Option<f64>,

    /// Due date (YYYY-MM-DD), measured from --asof.
    #[arg(long, value_parser = parse_date_arg)]
    pub due: Option<NaiveDate>,
}

impl DeadlineArgs {
    pub fn to_deadline(&self, asof: NaiveDate) -> Option<Deadline> {
        if let Some(y) = self.years {
            return Some(Deadline::Years(y));
        }
        if let Some(d) = self.days {
            return Some(Deadline::Days(d));
        }
        self.due.map(|date| Deadline::Due { date, asof })
    }
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    /// Task name used in the report.
    #[arg(long, default_value = "task")]
    pub name: String,

    /// Current effort estimate S (hours).
    #[arg(short = 's', long)]
    pub current: f64,

    /// Target effort K (hours).
    #[arg(short = 'k', long)]
    pub target: f64,

    #[command(flatten)]
    pub deadline: DeadlineArgs,

    /// As-of date for --due (default: today).
    #[arg(long, value_parser = parse_date_arg)]
    pub asof: Option<NaiveDate>,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Task CSV (name, current_estimate, target_effort, deadline column, optional volatility).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub tasks: PathBuf,

    /// History CSV (planned, actual); its volatility is used for every task.
    #[arg(long, value_name = "CSV")]
    pub history: Option<PathBuf>,

    /// Use each task's `volatility` column (missing values use --volatility).
    #[arg(long, conflicts_with = "history")]
    pub per_task: bool,

    /// Volatility estimator for --history.
    #[arg(long, value_enum, default_value_t = EstimatorKind::Relative)]
    pub estimator: EstimatorKind,

    /// As-of date for `due_date` columns (default: today).
    #[arg(long, value_parser = parse_date_arg)]
    pub asof: Option<NaiveDate>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Render an ASCII chart of forecast vs target (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns; default: EF_PLOT_WIDTH or 60).
    #[arg(long)]
    pub width: Option<usize>,

    /// Export per-task results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full run (settings, reports, summary) to JSON.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct VolatilityArgs {
    /// History CSV (planned, actual).
    #[arg(short = 'f', long, value_name = "CSV")]
    pub history: PathBuf,

    #[arg(long, value_enum, default_value_t = EstimatorKind::Relative)]
    pub estimator: EstimatorKind,
}

#[derive(Debug, Args, Clone, Default)]
pub struct InteractiveArgs {
    /// Risk-free rate r (default: EF_RISK_FREE_RATE or 0.05).
    #[arg(short = 'r', long)]
    pub rate: Option<f64>,

    /// Disable the chart after the summary.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Current effort estimate S (hours).
    #[arg(short = 's', long)]
    pub current: f64,

    /// Target effort K (hours).
    #[arg(short = 'k', long)]
    pub target: f64,

    /// Time to deadline in years.
    #[arg(long)]
    pub years: f64,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Number of simulated paths.
    #[arg(long, default_value_t = 100_000)]
    pub paths: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::io::parse_date(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_args_parse() {
        let cli = Cli::try_parse_from(["ef", "forecast", "-s", "50", "-k", "60", "--days", "30", "-r", "0.02"]).unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.current, 50.0);
        assert_eq!(args.model.rate, Some(0.02));
        let asof = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(args.deadline.to_deadline(asof), Some(Deadline::Days(30.0)));
    }

    #[test]
    fn deadline_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["ef", "forecast", "-s", "50", "-k", "60"]).is_err());
        assert!(Cli::try_parse_from(["ef", "forecast", "-s", "50", "-k", "60", "--years", "1", "--days", "3"]).is_err());
    }

    #[test]
    fn per_task_conflicts_with_history() {
        let res = Cli::try_parse_from(["ef", "batch", "-f", "t.csv", "--history", "h.csv", "--per-task"]);
        assert!(res.is_err());
    }

    #[test]
    fn due_dates_are_validated() {
        assert!(Cli::try_parse_from(["ef", "forecast", "-s", "1", "-k", "2", "--due", "soon"]).is_err());
        let cli = Cli::try_parse_from(["ef", "forecast", "-s", "1", "-k", "2", "--due", "2025-06-30"]).unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.deadline.due, NaiveDate::from_ymd_opt(2025, 6, 30));
    }
}

//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and reads environment defaults
//! - collects tasks (flags, CSV files or the interactive prompt)
//! - runs the forecast pipeline
//! - prints reports/charts
//! - writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};

use crate::cli::prompt::Prompter;
use crate::cli::{
    BatchArgs, Command, ForecastArgs, InteractiveArgs, ModelArgs, SimulateArgs, VolatilityArgs,
};
use crate::config::Settings;
use crate::domain::{CdfKind, EstimationInput, RunConfig, TaskInput, VolatilitySource};
use crate::error::AppError;
use crate::io::RowError;

pub mod pipeline;

/// Entry point for the `ef` binary.
pub fn run() -> Result<(), AppError> {
    // `ef` and `ef -r 0.02` behave like `ef interactive ...`. Clap needs a
    // subcommand name, so argv is rewritten before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Forecast(args) => handle_forecast(args, &settings),
        Command::Batch(args) => handle_batch(args, &settings),
        Command::Volatility(args) => handle_volatility(args),
        Command::Interactive(args) => handle_interactive(args, &settings),
        Command::Simulate(args) => handle_simulate(args, &settings),
    }
}

fn handle_forecast(args: ForecastArgs, settings: &Settings) -> Result<(), AppError> {
    let asof = args.asof.unwrap_or_else(today);
    let deadline = args
        .deadline
        .to_deadline(asof)
        .ok_or_else(|| AppError::new(2, "Provide one of --years, --days or --due."))?;
    let (risk_free_rate, sigma) = model_values(&args.model, settings)?;

    let task = TaskInput {
        name: args.name,
        current_estimate: args.current,
        target_effort: args.target,
        time_to_deadline: deadline.years(),
        volatility: None,
    };
    let config = RunConfig {
        risk_free_rate,
        volatility: VolatilitySource::Common { sigma },
        cdf: args.model.cdf,
        plot: false,
        plot_width: settings.plot_width,
        export_results: None,
        export_json: None,
    };

    let out = pipeline::run_batch(std::slice::from_ref(&task), &config)?;
    for report in &out.reports {
        println!("{}", crate::report::format_task_report(report));
    }
    Ok(())
}

fn handle_batch(args: BatchArgs, settings: &Settings) -> Result<(), AppError> {
    let asof = args.asof.unwrap_or_else(today);
    let ingest = crate::io::load_tasks(&args.tasks, asof)?;
    report_skipped_rows("task", &ingest.row_errors);

    let history = match &args.history {
        Some(path) => {
            let history = crate::io::load_history(path)?;
            report_skipped_rows("history", &history.row_errors);
            Some(history.observations)
        }
        None => None,
    };

    let config = batch_config_from_args(&args, settings, history.as_ref())?;
    let run = pipeline::run_batch(&ingest.tasks, &config)?;

    println!("{}", crate::report::format_run_header(&config, run.reports.len()));
    println!("{}", crate::report::format_summary_table(&run.reports));
    println!("{}", crate::report::format_risk_breakdown(&run.summary, &run.reports));

    if config.plot {
        println!("{}", crate::plot::render_forecast_chart(&run.reports, config.plot_width));
    }

    if let Some(path) = &config.export_results {
        crate::io::write_results_csv(path, &run.reports)?;
        info!("wrote {}", path.display());
    }
    if let Some(path) = &config.export_json {
        let results = crate::io::build_results_file(&run.reports, &run.summary, &config);
        crate::io::write_results_json(path, &results)?;
        info!("wrote {}", path.display());
    }

    Ok(())
}

/// Build the run configuration for `ef batch`.
pub fn batch_config_from_args(
    args: &BatchArgs,
    settings: &Settings,
    history: Option<&crate::io::HistoricalObservations>,
) -> Result<RunConfig, AppError> {
    let (risk_free_rate, sigma) = model_values(&args.model, settings)?;
    let volatility = pipeline::resolve_volatility_source(sigma, args.per_task, history, args.estimator)?;

    Ok(RunConfig {
        risk_free_rate,
        volatility,
        cdf: args.model.cdf,
        plot: args.plot && !args.no_plot,
        plot_width: args.width.unwrap_or(settings.plot_width).max(10),
        export_results: args.export.clone(),
        export_json: args.json.clone(),
    })
}

fn handle_volatility(args: VolatilityArgs) -> Result<(), AppError> {
    let ingest = crate::io::load_history(&args.history)?;
    report_skipped_rows("history", &ingest.row_errors);

    let history = &ingest.observations;
    let raw = history.volatility(args.estimator)?;
    let floored = history.floored_volatility(args.estimator)?;

    println!("Estimator: {:?}", args.estimator);
    println!("Pairs used: {}", history.len());
    println!("Volatility σ: {raw:.6}");
    if history.len() < crate::math::MIN_OBSERVATIONS {
        println!("(fewer than {} pairs: default volatility)", crate::math::MIN_OBSERVATIONS);
    }
    if floored != raw {
        println!("Forecasts use the floored value σ = {floored:.4}.");
    }
    Ok(())
}

fn handle_interactive(args: InteractiveArgs, settings: &Settings) -> Result<(), AppError> {
    let risk_free_rate = checked_rate(args.rate.unwrap_or(settings.risk_free_rate))?;

    let session = {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut prompter = Prompter::new(stdin.lock(), stdout.lock());
        prompter.collect_session(settings.volatility)?
    };

    let config = RunConfig {
        risk_free_rate,
        volatility: session.volatility,
        cdf: CdfKind::ZelenSevero,
        plot: !args.no_plot,
        plot_width: settings.plot_width,
        export_results: None,
        export_json: None,
    };
    let run = pipeline::run_batch(&session.tasks, &config)?;

    println!();
    println!("{}", crate::report::format_run_header(&config, run.reports.len()));
    println!("{}", crate::report::format_summary_table(&run.reports));
    println!("{}", crate::report::format_risk_breakdown(&run.summary, &run.reports));
    if config.plot {
        println!("{}", crate::plot::render_forecast_chart(&run.reports, config.plot_width));
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs, settings: &Settings) -> Result<(), AppError> {
    let (risk_free_rate, volatility) = model_values(&args.model, settings)?;
    let input = EstimationInput {
        current_estimate: args.current,
        target_effort: args.target,
        time_to_deadline: args.years,
        volatility,
        risk_free_rate,
    };

    let res = crate::data::simulate_forecast(&input, args.paths, args.seed)?;
    println!("Closed form : {:.4}h", res.closed_form);
    println!(
        "Monte Carlo : {:.4}h ± {:.4} ({} paths, seed {})",
        res.estimate, res.std_error, res.paths, args.seed
    );
    println!("Gap        : {:+.2} standard errors", res.z_score());
    if res.z_score().abs() > 4.0 {
        warn!("simulation is {:.1} standard errors from the closed form", res.z_score());
    }
    Ok(())
}

/// Rate and volatility from flags, falling back to environment defaults.
fn model_values(model: &ModelArgs, settings: &Settings) -> Result<(f64, f64), AppError> {
    let rate = checked_rate(model.rate.unwrap_or(settings.risk_free_rate))?;
    let sigma = model.volatility.unwrap_or(settings.volatility);
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(AppError::new(2, "--volatility must be a non-negative number."));
    }
    Ok((rate, sigma))
}

fn checked_rate(rate: f64) -> Result<f64, AppError> {
    if !rate.is_finite() {
        return Err(AppError::new(2, "--rate must be a finite number."));
    }
    Ok(rate)
}

fn report_skipped_rows(kind: &str, errors: &[RowError]) {
    for e in errors {
        match &e.name {
            Some(name) => eprintln!("Skipped {kind} line {} ({name}): {}", e.line, e.message),
            None => eprintln!("Skipped {kind} line {}: {}", e.line, e.message),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Rewrite argv so `ef` defaults to `ef interactive`.
///
/// Rules:
/// - `ef`                      -> `ef interactive`
/// - `ef -r 0.02 ...`          -> `ef interactive -r 0.02 ...`
/// - `ef --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("interactive".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "forecast" | "batch" | "volatility" | "interactive" | "simulate"
    );
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "interactive".to_string());
    }
    argv
}

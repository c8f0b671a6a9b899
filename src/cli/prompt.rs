//! Interactive task entry.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the prompter provides the "run `ef` and type your tasks" UX
//!
//! Every question is a read-validate-retry loop: malformed answers print a
//! message and ask again, only end of input aborts. The prompter is generic
//! over its reader/writer so tests can drive it with in-memory buffers.

use std::io::{BufRead, Write};

use log::warn;

use crate::app::pipeline::resolve_volatility_source;
use crate::domain::{DAYS_PER_YEAR, EstimatorKind, TaskInput, VolatilitySource};
use crate::error::AppError;
use crate::io::HistoricalObservations;

/// Upper bound on tasks per session.
const MAX_TASKS: usize = 500;

/// Upper bound on typed-in historical pairs.
const MAX_HISTORY_PAIRS: usize = 200;

/// Everything collected in one interactive session.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveSession {
    pub tasks: Vec<TaskInput>,
    pub volatility: VolatilitySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolatilityMode {
    Common,
    PerTask,
    History,
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run the whole session: task count, volatility mode, then each task.
    ///
    /// `default_sigma` is offered as the common volatility and substituted
    /// when a historical estimate fails.
    pub fn collect_session(&mut self, default_sigma: f64) -> Result<InteractiveSession, AppError> {
        self.say("Effort forecast: enter your tasks (Ctrl-D to abort).")?;

        let count = self.ask("Number of tasks: ", |s| {
            let n: usize = s.parse().map_err(|_| format!("'{s}' is not a whole number."))?;
            if !(1..=MAX_TASKS).contains(&n) {
                return Err(format!("Enter a number between 1 and {MAX_TASKS}."));
            }
            Ok(n)
        })?;

        let mode = self.ask("Volatility: [c]ommon, [p]er task or [h]istory? [c]: ", parse_mode)?;
        let volatility = match mode {
            VolatilityMode::Common => {
                let sigma = self.ask(&format!("Common volatility σ [{default_sigma}]: "), |s| {
                    parse_optional_sigma(s).map(|v| v.unwrap_or(default_sigma))
                })?;
                VolatilitySource::Common { sigma }
            }
            VolatilityMode::PerTask => VolatilitySource::PerTask { fallback: default_sigma },
            VolatilityMode::History => self.collect_history(default_sigma)?,
        };

        let mut tasks = Vec::with_capacity(count);
        for i in 1..=count {
            self.say(&format!("\nTask {i} of {count}"))?;
            tasks.push(self.collect_task(i, mode == VolatilityMode::PerTask)?);
        }

        Ok(InteractiveSession { tasks, volatility })
    }

    fn collect_history(&mut self, default_sigma: f64) -> Result<VolatilitySource, AppError> {
        let pairs = self.ask("Number of historical planned/actual pairs: ", |s| {
            let n: usize = s.parse().map_err(|_| format!("'{s}' is not a whole number."))?;
            if n > MAX_HISTORY_PAIRS {
                return Err(format!("Enter a number between 0 and {MAX_HISTORY_PAIRS}."));
            }
            Ok(n)
        })?;

        let mut planned = Vec::new();
        let mut actual = Vec::new();
        for i in 1..=pairs {
            planned.push(self.ask(&format!("  planned effort #{i}: "), parse_positive)?);
            actual.push(self.ask(&format!("  actual effort #{i}: "), parse_positive)?);
        }

        let resolved = HistoricalObservations::new(planned, actual)
            .and_then(|history| resolve_volatility_source(default_sigma, false, Some(&history), EstimatorKind::Relative));
        match resolved {
            Ok(source) => {
                self.say(&format!("Using {}.", source.describe()))?;
                Ok(source)
            }
            Err(err) => {
                warn!("historical volatility failed: {err}");
                self.say(&format!(
                    "Could not estimate volatility ({err}). Using σ={default_sigma}."
                ))?;
                Ok(VolatilitySource::Common { sigma: default_sigma })
            }
        }
    }

    fn collect_task(&mut self, index: usize, per_task_sigma: bool) -> Result<TaskInput, AppError> {
        let name = self.ask(&format!("  name [Task {index}]: "), |s| {
            Ok(if s.is_empty() { format!("Task {index}") } else { s.to_string() })
        })?;
        let current_estimate = self.ask("  current estimate (hours): ", parse_positive)?;
        let target_effort = self.ask("  target effort (hours): ", parse_positive)?;
        let time_to_deadline = self.ask("  time to deadline (years, or days as `30d`): ", parse_horizon)?;
        let volatility = if per_task_sigma {
            self.ask("  volatility σ [default]: ", parse_optional_sigma)?
        } else {
            None
        };

        Ok(TaskInput {
            name,
            current_estimate,
            target_effort,
            time_to_deadline,
            volatility,
        })
    }

    /// Prompt until `parse` accepts the trimmed answer.
    fn ask<T>(&mut self, label: &str, parse: impl Fn(&str) -> Result<T, String>) -> Result<T, AppError> {
        loop {
            write!(self.output, "{label}").map_err(write_error)?;
            self.output.flush().map_err(write_error)?;

            let mut line = String::new();
            let bytes = self
                .input
                .read_line(&mut line)
                .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
            if bytes == 0 {
                return Err(AppError::new(
                    2,
                    "Input ended early. Use `ef batch -f <tasks.csv>` for non-interactive runs.",
                ));
            }

            match parse(line.trim()) {
                Ok(value) => return Ok(value),
                Err(msg) => self.say(&msg)?,
            }
        }
    }

    fn say(&mut self, msg: &str) -> Result<(), AppError> {
        writeln!(self.output, "{msg}").map_err(write_error)
    }
}

fn write_error(e: std::io::Error) -> AppError {
    AppError::new(4, format!("Failed to write prompt: {e}"))
}

fn parse_mode(s: &str) -> Result<VolatilityMode, String> {
    match s.to_ascii_lowercase().as_str() {
        "" | "c" | "common" => Ok(VolatilityMode::Common),
        "p" | "per-task" | "per task" => Ok(VolatilityMode::PerTask),
        "h" | "history" => Ok(VolatilityMode::History),
        other => Err(format!("Unknown choice '{other}'. Enter c, p or h.")),
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("'{s}' is not a number.")),
    }
}

fn parse_positive(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if v <= 0.0 {
        return Err("Enter a value greater than 0.".to_string());
    }
    Ok(v)
}

/// Years by default; a `d` suffix means days.
fn parse_horizon(s: &str) -> Result<f64, String> {
    let years = match s.strip_suffix(['d', 'D']) {
        Some(days) => parse_positive(days.trim())? / DAYS_PER_YEAR,
        None => parse_positive(s)?,
    };
    Ok(years)
}

/// Empty answer means "use the default".
fn parse_optional_sigma(s: &str) -> Result<Option<f64>, String> {
    if s.is_empty() {
        return Ok(None);
    }
    let v = parse_number(s)?;
    if v < 0.0 {
        return Err("Volatility cannot be negative.".to_string());
    }
    Ok(Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str) -> (Result<InteractiveSession, AppError>, String) {
        let mut out = Vec::new();
        let res = Prompter::new(Cursor::new(script.as_bytes()), &mut out).collect_session(0.3);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn common_volatility_session() {
        let (res, _) = run("2\nc\n0.25\napi\n50\n60\n0.5\n\n40\n35\n30d\n");
        let session = res.unwrap();
        assert_eq!(session.volatility, VolatilitySource::Common { sigma: 0.25 });
        assert_eq!(session.tasks.len(), 2);
        assert_eq!(session.tasks[0].name, "api");
        assert_eq!(session.tasks[0].time_to_deadline, 0.5);
        assert_eq!(session.tasks[1].name, "Task 2");
        assert!((session.tasks[1].time_to_deadline - 30.0 / 365.25).abs() < 1e-12);
    }

    #[test]
    fn malformed_answers_are_reprompted() {
        let (res, out) = run("abc\n0\n1\nx\n\n\n\nfoo\n-3\n10\n12\n1\n");
        let session = res.unwrap();
        assert_eq!(session.tasks.len(), 1);
        assert_eq!(session.tasks[0].name, "Task 1");
        assert_eq!(session.volatility, VolatilitySource::Common { sigma: 0.3 });
        assert_eq!(session.tasks[0].current_estimate, 10.0);
        assert!(out.contains("'abc' is not a whole number."));
        assert!(out.contains("Enter a number between 1 and 500."));
        assert!(out.contains("Unknown choice 'x'"));
        assert!(out.contains("'foo' is not a number."));
        assert!(out.contains("Enter a value greater than 0."));
    }

    #[test]
    fn per_task_volatility_allows_blank() {
        let (res, _) = run("2\np\na\n10\n12\n1\n0.4\nb\n10\n12\n1\n\n");
        let session = res.unwrap();
        assert_eq!(session.volatility, VolatilitySource::PerTask { fallback: 0.3 });
        assert_eq!(session.tasks[0].volatility, Some(0.4));
        assert_eq!(session.tasks[1].volatility, None);
    }

    #[test]
    fn history_pairs_drive_volatility() {
        // Relative deviations 0.2, -0.1, 0.1 -> sample std 0.152752523
        let (res, _) = run("1\nh\n3\n10\n12\n20\n18\n30\n33\nt\n10\n12\n1\n");
        let session = res.unwrap();
        match session.volatility {
            VolatilitySource::History { sigma, observations } => {
                assert!((sigma - 0.152752523).abs() < 1e-8);
                assert_eq!(observations, 3);
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn single_history_pair_uses_fallback() {
        let (res, _) = run("1\nh\n1\n10\n12\nt\n10\n12\n1\n");
        let session = res.unwrap();
        assert_eq!(session.volatility, VolatilitySource::History { sigma: 0.3, observations: 1 });
    }

    #[test]
    fn oversized_history_count_is_reprompted() {
        let (res, out) = run("1\nh\n18446744073709551615\n99999999999999999999\n2\n10\n12\n20\n18\nt\n10\n12\n1\n");
        let session = res.unwrap();
        assert!(out.contains("Enter a number between 0 and 200."));
        assert!(out.contains("'99999999999999999999' is not a whole number."));
        assert!(matches!(session.volatility, VolatilitySource::History { observations: 2, .. }));
        assert_eq!(session.tasks.len(), 1);
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (res, _) = run("2\nc\n\napi\n50\n");
        assert_eq!(res.unwrap_err().exit_code(), 2);
    }

    #[test]
    fn horizon_parsing() {
        assert_eq!(parse_horizon("0.25"), Ok(0.25));
        assert!((parse_horizon("365.25d").unwrap() - 1.0).abs() < 1e-12);
        assert!(parse_horizon("0d").is_err());
        assert!(parse_horizon("soon").is_err());
    }
}

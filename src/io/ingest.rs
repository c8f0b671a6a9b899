//! CSV ingest for task lists.
//!
//! A task file needs `name`, `current_estimate` and `target_effort`, plus one
//! deadline column:
//!
//! - `time_to_deadline` (years)
//! - `days_to_deadline`
//! - `due_date` (relative to the run's as-of date)
//!
//! An optional `volatility` column feeds `--per-task` runs.
//!
//! Bad rows are skipped and reported with their line number; the file only
//! fails as a whole when its header is unusable or no row survives.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{Deadline, TaskInput};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub name: Option<String>,
    pub message: String,
}

/// Ingest output: parsed tasks plus what was skipped.
#[derive(Debug, Clone)]
pub struct TaskIngest {
    pub tasks: Vec<TaskInput>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a task CSV from disk.
pub fn load_tasks(path: &Path, asof: NaiveDate) -> Result<TaskIngest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open task CSV '{}': {e}", path.display())))?;
    let ingest = read_tasks(file, asof)?;
    debug!(
        "loaded {} task(s) from {} ({} row(s) skipped)",
        ingest.tasks.len(),
        path.display(),
        ingest.row_errors.len()
    );
    Ok(ingest)
}

/// Parse a task CSV from any reader.
pub fn read_tasks<R: Read>(reader: R, asof: NaiveDate) -> Result<TaskIngest, AppError> {
    let mut reader = csv_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_task_columns_exist(&header_map)?;

    let mut tasks = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    name: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_task_row(&record, &header_map, asof) {
            Ok(task) => tasks.push(task),
            Err(message) => {
                let name = get_optional(&record, &header_map, "name").map(str::to_string);
                warn!("skipping task row {line}: {message}");
                row_errors.push(RowError { line, name, message });
            }
        }
    }

    if tasks.is_empty() {
        return Err(AppError::new(2, "No valid task rows found in CSV."));
    }

    Ok(TaskIngest {
        tasks,
        row_errors,
        rows_read,
    })
}

pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_task_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for column in ["name", "current_estimate", "target_effort"] {
        if !header_map.contains_key(column) {
            return Err(AppError::new(2, format!("Missing required column: `{column}`")));
        }
    }
    let has_deadline = ["time_to_deadline", "days_to_deadline", "due_date"]
        .iter()
        .any(|c| header_map.contains_key(*c));
    if !has_deadline {
        return Err(AppError::new(
            2,
            "Missing deadline column: one of `time_to_deadline`, `days_to_deadline`, `due_date`.",
        ));
    }
    Ok(())
}

fn parse_task_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    asof: NaiveDate,
) -> Result<TaskInput, String> {
    let name = get_required(record, header_map, "name")?.to_string();
    let current_estimate = parse_positive(get_required(record, header_map, "current_estimate")?, "current_estimate")?;
    let target_effort = parse_positive(get_required(record, header_map, "target_effort")?, "target_effort")?;

    let deadline = if let Some(raw) = get_optional(record, header_map, "time_to_deadline") {
        Deadline::Years(parse_positive(raw, "time_to_deadline")?)
    } else if let Some(raw) = get_optional(record, header_map, "days_to_deadline") {
        Deadline::Days(parse_positive(raw, "days_to_deadline")?)
    } else if let Some(raw) = get_optional(record, header_map, "due_date") {
        Deadline::Due {
            date: parse_date(raw)?,
            asof,
        }
    } else {
        return Err("Missing deadline value.".to_string());
    };

    let time_to_deadline = deadline.years();
    if time_to_deadline <= 0.0 {
        return Err(format!("Deadline is not after the as-of date ({asof})."));
    }

    let volatility = match get_optional(record, header_map, "volatility") {
        Some(raw) => Some(parse_non_negative(raw, "volatility")?),
        None => None,
    };

    Ok(TaskInput {
        name,
        current_estimate,
        target_effort,
        time_to_deadline,
        volatility,
    })
}

pub(crate) fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

pub(crate) fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `{field}`: '{s}'"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value for `{field}`: '{s}'"))
    }
}

pub(crate) fn parse_positive(s: &str, field: &str) -> Result<f64, String> {
    let v = parse_f64(s, field)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(format!("`{field}` must be > 0 (got {v})"))
    }
}

fn parse_non_negative(s: &str, field: &str) -> Result<f64, String> {
    let v = parse_f64(s, field)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(format!("`{field}` must be >= 0 (got {v})"))
    }
}

/// Parse a calendar date in one of the accepted formats.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asof() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn reads_years_days_and_due_dates() {
        let csv = "\u{feff}Name,Current_Estimate,Target_Effort,time_to_deadline,days_to_deadline,due_date,volatility\n\
                   api,50,60,0.5,,,\n\
                   ui,40,35,,109.575,,0.2\n\
                   docs,8,10,,,2025-07-02,\n";
        let ingest = read_tasks(csv.as_bytes(), asof()).unwrap();
        assert_eq!(ingest.rows_read, 3);
        assert!(ingest.row_errors.is_empty());
        assert_eq!(ingest.tasks.len(), 3);

        assert_eq!(ingest.tasks[0].name, "api");
        assert_eq!(ingest.tasks[0].time_to_deadline, 0.5);
        assert_eq!(ingest.tasks[0].volatility, None);

        assert!((ingest.tasks[1].time_to_deadline - 0.3).abs() < 1e-12);
        assert_eq!(ingest.tasks[1].volatility, Some(0.2));

        assert!((ingest.tasks[2].time_to_deadline - 182.0 / 365.25).abs() < 1e-12);
    }

    #[test]
    fn bad_rows_are_skipped_with_line_numbers() {
        let csv = "name,current_estimate,target_effort,time_to_deadline\n\
                   ok,10,12,0.5\n\
                   neg,-1,12,0.5\n\
                   text,abc,12,0.5\n\
                   late,10,12,0\n";
        let ingest = read_tasks(csv.as_bytes(), asof()).unwrap();
        assert_eq!(ingest.tasks.len(), 1);
        let lines: Vec<usize> = ingest.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5]);
        assert_eq!(ingest.row_errors[0].name.as_deref(), Some("neg"));
    }

    #[test]
    fn due_date_in_the_past_is_rejected() {
        let csv = "name,current_estimate,target_effort,due_date\n\
                   past,10,12,2024-12-01\n\
                   future,10,12,2025-02-01\n";
        let ingest = read_tasks(csv.as_bytes(), asof()).unwrap();
        assert_eq!(ingest.tasks.len(), 1);
        assert_eq!(ingest.tasks[0].name, "future");
    }

    #[test]
    fn missing_columns_fail_the_file() {
        let err = read_tasks("name,current_estimate\nx,1\n".as_bytes(), asof()).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let err = read_tasks("name,current_estimate,target_effort\nx,1,2\n".as_bytes(), asof()).unwrap_err();
        assert!(err.to_string().contains("deadline"));
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let csv = "name,current_estimate,target_effort,time_to_deadline\nbad,0,1,1\n";
        assert!(read_tasks(csv.as_bytes(), asof()).is_err());
    }

    #[test]
    fn parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(parse_date("2025-03-04").unwrap(), d);
        assert_eq!(parse_date("04/03/2025").unwrap(), d);
        assert!(parse_date("March 4").is_err());
    }
}

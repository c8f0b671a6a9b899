//! Historical planned/actual effort pairs.
//!
//! The history file is a CSV with `planned` and `actual` columns (hours).
//! Rows that do not parse are skipped and reported; a file without either
//! column is rejected as invalid input.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::domain::{EstimatorKind, HISTORY_VOLATILITY_FLOOR};
use crate::error::{AppError, EstimationError};
use crate::io::ingest::{RowError, build_header_map, csv_reader, get_required, parse_f64};

/// Paired historical observations, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalObservations {
    pub planned: Vec<f64>,
    pub actual: Vec<f64>,
}

impl HistoricalObservations {
    /// Build from two sequences; they must have the same length.
    pub fn new(planned: Vec<f64>, actual: Vec<f64>) -> Result<Self, EstimationError> {
        if planned.len() != actual.len() {
            return Err(EstimationError::LengthMismatch {
                planned: planned.len(),
                actual: actual.len(),
            });
        }
        Ok(Self { planned, actual })
    }

    pub fn push(&mut self, planned: f64, actual: f64) {
        self.planned.push(planned);
        self.actual.push(actual);
    }

    pub fn len(&self) -> usize {
        self.planned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }

    /// Raw estimator output, without the history floor.
    pub fn volatility(&self, estimator: EstimatorKind) -> Result<f64, EstimationError> {
        estimator.estimate(&self.planned, &self.actual)
    }

    /// Estimator output floored at `HISTORY_VOLATILITY_FLOOR`.
    ///
    /// This is the value used when history drives the forecasts.
    pub fn floored_volatility(&self, estimator: EstimatorKind) -> Result<f64, EstimationError> {
        let raw = self.volatility(estimator)?;
        if raw < HISTORY_VOLATILITY_FLOOR {
            debug!("historical volatility {raw:.6} below floor, using {HISTORY_VOLATILITY_FLOOR}");
            return Ok(HISTORY_VOLATILITY_FLOOR);
        }
        Ok(raw)
    }
}

/// Ingest output for a history file.
#[derive(Debug, Clone)]
pub struct HistoryIngest {
    pub observations: HistoricalObservations,
    pub row_errors: Vec<RowError>,
}

pub fn load_history(path: &Path) -> Result<HistoryIngest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open history CSV '{}': {e}", path.display())))?;
    let ingest = read_history(file)?;
    debug!(
        "loaded {} historical pair(s) from {}",
        ingest.observations.len(),
        path.display()
    );
    Ok(ingest)
}

pub fn read_history<R: Read>(reader: R) -> Result<HistoryIngest, AppError> {
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read history CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for column in ["planned", "actual"] {
        if !header_map.contains_key(column) {
            return Err(EstimationError::InvalidInput(format!(
                "history CSV has no `{column}` column"
            ))
            .into());
        }
    }

    let mut observations = HistoricalObservations::default();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| {
                let planned = parse_f64(get_required(&record, &header_map, "planned")?, "planned")?;
                let actual = parse_f64(get_required(&record, &header_map, "actual")?, "actual")?;
                if planned == 0.0 {
                    return Err("`planned` must be non-zero".to_string());
                }
                Ok((planned, actual))
            });

        match parsed {
            Ok((planned, actual)) => observations.push(planned, actual),
            Err(message) => {
                warn!("skipping history row {line}: {message}");
                row_errors.push(RowError {
                    line,
                    name: None,
                    message,
                });
            }
        }
    }

    Ok(HistoryIngest {
        observations,
        row_errors,
    })
}

//! Historical volatility from paired planned/actual efforts.
//!
//! Deviations are taken relative to the planned effort, so a 2h overrun on a
//! 10h task weighs the same as a 20h overrun on a 100h task. The sample
//! standard deviation of those deviations is the volatility.

use crate::error::EstimationError;

/// Volatility returned when fewer than two observations are available.
pub const FALLBACK_VOLATILITY: f64 = 0.3;

/// Minimum number of pairs needed to estimate a dispersion.
pub const MIN_OBSERVATIONS: usize = 2;

/// Estimates a volatility figure from paired historical observations.
pub trait VolatilityEstimator {
    fn estimate(&self, planned: &[f64], actual: &[f64]) -> Result<f64, EstimationError>;
}

/// Sample standard deviation of `(actual - planned) / planned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeDeviation;

/// Sample standard deviation of `ln(actual / planned)`.
///
/// Closer to the lognormal assumption behind the forecast formula, but it
/// needs strictly positive planned and actual values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRatio;

impl VolatilityEstimator for RelativeDeviation {
    fn estimate(&self, planned: &[f64], actual: &[f64]) -> Result<f64, EstimationError> {
        if let Some(early) = check_pairs(planned, actual)? {
            return Ok(early);
        }

        for (i, (&p, &a)) in planned.iter().zip(actual).enumerate() {
            if p == 0.0 {
                return Err(EstimationError::InvalidInput(format!(
                    "planned effort #{} is zero",
                    i + 1
                )));
            }
            ensure_finite(i, p, a)?;
        }

        let deviations: Vec<f64> = planned
            .iter()
            .zip(actual)
            .map(|(&p, &a)| (a - p) / p)
            .collect();
        Ok(sample_std(&deviations))
    }
}

impl VolatilityEstimator for LogRatio {
    fn estimate(&self, planned: &[f64], actual: &[f64]) -> Result<f64, EstimationError> {
        if let Some(early) = check_pairs(planned, actual)? {
            return Ok(early);
        }

        for (i, (&p, &a)) in planned.iter().zip(actual).enumerate() {
            ensure_finite(i, p, a)?;
            if p <= 0.0 || a <= 0.0 {
                return Err(EstimationError::InvalidInput(format!(
                    "observation #{} must have positive planned and actual efforts for log ratios",
                    i + 1
                )));
            }
        }

        let log_ratios: Vec<f64> = planned
            .iter()
            .zip(actual)
            .map(|(&p, &a)| (a / p).ln())
            .collect();
        Ok(sample_std(&log_ratios))
    }
}

/// Estimate volatility with the default relative-deviation estimator.
pub fn estimate_volatility(planned: &[f64], actual: &[f64]) -> Result<f64, EstimationError> {
    RelativeDeviation.estimate(planned, actual)
}

/// Shared preconditions: equal lengths, and the small-sample fallback.
fn check_pairs(planned: &[f64], actual: &[f64]) -> Result<Option<f64>, EstimationError> {
    if planned.len() != actual.len() {
        return Err(EstimationError::LengthMismatch {
            planned: planned.len(),
            actual: actual.len(),
        });
    }
    if planned.len() < MIN_OBSERVATIONS {
        return Ok(Some(FALLBACK_VOLATILITY));
    }
    Ok(None)
}

fn ensure_finite(i: usize, planned: f64, actual: f64) -> Result<(), EstimationError> {
    if planned.is_finite() && actual.is_finite() {
        Ok(())
    } else {
        Err(EstimationError::InvalidInput(format!(
            "observation #{} is not a finite number",
            i + 1
        )))
    }
}

/// Sample standard deviation (n - 1 denominator). Requires `values.len() >= 2`.
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    // abs() guards the -0.0 / tiny negative results of cancellation.
    variance.sqrt().abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_deviation_has_zero_volatility() {
        let vol = estimate_volatility(&[10.0, 20.0], &[10.0, 20.0]).unwrap();
        assert_eq!(vol, 0.0);
    }

    #[test]
    fn constant_relative_overrun_has_zero_volatility() {
        // Every task ran 20% over: no dispersion.
        let vol = estimate_volatility(&[10.0, 20.0, 50.0], &[12.0, 24.0, 60.0]).unwrap();
        assert!(vol.abs() < 1e-12, "expected ~0, got {vol}");
    }

    #[test]
    fn single_pair_falls_back() {
        let vol = estimate_volatility(&[10.0], &[12.0]).unwrap();
        assert_eq!(vol, FALLBACK_VOLATILITY);
        assert_eq!(estimate_volatility(&[], &[]).unwrap(), FALLBACK_VOLATILITY);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = estimate_volatility(&[10.0, 20.0], &[12.0]).unwrap_err();
        assert_eq!(err, EstimationError::LengthMismatch { planned: 2, actual: 1 });
    }

    #[test]
    fn length_mismatch_wins_over_fallback() {
        let err = estimate_volatility(&[10.0], &[]).unwrap_err();
        assert!(matches!(err, EstimationError::LengthMismatch { .. }));
    }

    #[test]
    fn known_sample() {
        // Deviations: +0.2, -0.1, +0.1 -> mean 0.0667, sample std 0.152753
        let vol = estimate_volatility(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
        assert!((vol - 0.152_752_523).abs() < 1e-8, "got {vol}");
    }

    #[test]
    fn zero_planned_effort_is_invalid() {
        let err = estimate_volatility(&[10.0, 0.0], &[12.0, 3.0]).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidInput(_)));
    }

    #[test]
    fn log_ratio_known_sample() {
        let vol = LogRatio.estimate(&[10.0, 20.0, 30.0], &[12.0, 18.0, 33.0]).unwrap();
        assert!((vol - 0.147_535_692).abs() < 1e-8, "got {vol}");
    }

    #[test]
    fn log_ratio_rejects_non_positive_actuals() {
        let err = LogRatio.estimate(&[10.0, 20.0], &[12.0, 0.0]).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidInput(_)));
    }

    #[test]
    fn scaling_both_sequences_keeps_volatility() {
        let planned = [8.0, 16.0, 5.0, 40.0];
        let actual = [11.0, 15.0, 7.5, 52.0];
        let base = estimate_volatility(&planned, &actual).unwrap();

        let planned2: Vec<f64> = planned.iter().map(|v| v * 2.0).collect();
        let actual2: Vec<f64> = actual.iter().map(|v| v * 2.0).collect();
        let scaled = estimate_volatility(&planned2, &actual2).unwrap();

        assert!((base - scaled).abs() < 1e-12);
    }
}

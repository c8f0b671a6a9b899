//! Defaults read from the environment (and `.env`).
//!
//! CLI flags always win; these only fill in what the user did not pass.
//!
//! | variable            | default |
//! |---------------------|---------|
//! | `EF_RISK_FREE_RATE` | `0.05`  |
//! | `EF_VOLATILITY`     | `0.3`   |
//! | `EF_PLOT_WIDTH`     | `60`    |

use std::str::FromStr;

use log::warn;

use crate::error::AppError;
use crate::math::FALLBACK_VOLATILITY;

pub const ENV_RISK_FREE_RATE: &str = "EF_RISK_FREE_RATE";
pub const ENV_VOLATILITY: &str = "EF_VOLATILITY";
pub const ENV_PLOT_WIDTH: &str = "EF_PLOT_WIDTH";

const DEFAULT_RISK_FREE_RATE: f64 = 0.05;
const DEFAULT_PLOT_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub plot_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            volatility: FALLBACK_VOLATILITY,
            plot_width: DEFAULT_PLOT_WIDTH,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read overrides from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let risk_free_rate = parse_var(&lookup, ENV_RISK_FREE_RATE)?.unwrap_or(defaults.risk_free_rate);
        if !risk_free_rate.is_finite() {
            return Err(AppError::new(2, format!("{ENV_RISK_FREE_RATE} must be a finite number.")));
        }

        let volatility = parse_var(&lookup, ENV_VOLATILITY)?.unwrap_or(defaults.volatility);
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(AppError::new(2, format!("{ENV_VOLATILITY} must be a non-negative number.")));
        }

        let plot_width: Option<usize> = parse_var(&lookup, ENV_PLOT_WIDTH)?;
        let plot_width = match plot_width {
            Some(w) if w < 10 => {
                warn!("{ENV_PLOT_WIDTH}={w} is too narrow, using 10");
                10
            }
            Some(w) => w,
            None => defaults.plot_width,
        };

        Ok(Self {
            risk_free_rate,
            volatility,
            plot_width,
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|e| AppError::new(2, format!("Invalid {key}='{trimmed}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.volatility, 0.3);
    }

    #[test]
    fn overrides_are_parsed() {
        let s = Settings::from_lookup(lookup(&[
            (ENV_RISK_FREE_RATE, "0.02"),
            (ENV_VOLATILITY, " 0.25 "),
            (ENV_PLOT_WIDTH, "4"),
        ]))
        .unwrap();
        assert_eq!(s.risk_free_rate, 0.02);
        assert_eq!(s.volatility, 0.25);
        assert_eq!(s.plot_width, 10);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = Settings::from_lookup(lookup(&[(ENV_RISK_FREE_RATE, "fast")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = Settings::from_lookup(lookup(&[(ENV_VOLATILITY, "-1")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

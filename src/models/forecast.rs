//! Closed-form effort forecast.
//!
//! The current estimate `S` plays the spot price, the target `K` the strike,
//! the time to deadline `T` (years) the expiry and `σ` the volatility:
//!
//! ```text
//! d1 = [ln(S/K) + (r + σ²/2)·T] / (σ·√T)
//! d2 = d1 − σ·√T
//! forecast = S·Φ(d1) − K·e^(−r·T)·Φ(d2)
//! ```
//!
//! Degenerate inputs are handled without failing:
//! - `T <= 0`: no uncertainty can accrue, the current estimate is returned.
//! - `σ <= 0`: clamped to `MIN_VOLATILITY` (σ appears in a denominator).
//!
//! `S` and `K` are not validated; non-positive values yield NaN.

use crate::domain::EstimationInput;
use crate::math::{NormalCdf, ZelenSevero};

/// Floor applied to non-positive volatilities.
pub const MIN_VOLATILITY: f64 = 0.01;

/// Black-Scholes style forecaster, generic over the CDF approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EffortForecaster<C = ZelenSevero> {
    cdf: C,
}

impl<C: NormalCdf> EffortForecaster<C> {
    pub fn new(cdf: C) -> Self {
        Self { cdf }
    }

    /// Forecast effort for `(S, K, T, σ, r)`.
    pub fn forecast(&self, s: f64, k: f64, t: f64, sigma: f64, r: f64) -> f64 {
        if t <= 0.0 {
            return s;
        }
        let sigma = effective_sigma(sigma);
        let (d1, d2) = d1_d2(s, k, t, sigma, r);
        s * self.cdf.cdf(d1) - k * (-r * t).exp() * self.cdf.cdf(d2)
    }

    pub fn forecast_input(&self, input: &EstimationInput) -> f64 {
        self.forecast(
            input.current_estimate,
            input.target_effort,
            input.time_to_deadline,
            input.volatility,
            input.risk_free_rate,
        )
    }
}

/// Forecast effort with the default CDF approximation.
pub fn forecast_effort(s: f64, k: f64, t: f64, sigma: f64, r: f64) -> f64 {
    EffortForecaster::new(ZelenSevero).forecast(s, k, t, sigma, r)
}

/// The standardized distance terms `(d1, d2)`.
///
/// Expects `t > 0` and `sigma > 0`; `forecast` guarantees both before calling.
pub fn d1_d2(s: f64, k: f64, t: f64, sigma: f64, r: f64) -> (f64, f64) {
    let sigma_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}

/// Volatility actually used by the formula (non-positive values are floored).
pub fn effective_sigma(sigma: f64) -> f64 {
    if sigma <= 0.0 { MIN_VOLATILITY } else { sigma }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ErfCdf;

    #[test]
    fn matches_textbook_call_price() {
        // S=K=100, T=1, σ=20%, r=5% -> 10.4506
        let v = forecast_effort(100.0, 100.0, 1.0, 0.2, 0.05);
        assert!((v - 10.450_6).abs() < 1e-3, "got {v}");
    }

    #[test]
    fn matches_closed_form_for_task_scenarios() {
        let v = forecast_effort(50.0, 60.0, 0.5, 0.225, 0.05);
        assert!((v - 0.730_927).abs() < 1e-5, "got {v}");
        let v = forecast_effort(40.0, 35.0, 0.3, 0.225, 0.05);
        assert!((v - 5.774_769).abs() < 1e-5, "got {v}");
    }

    #[test]
    fn zero_horizon_returns_current_estimate() {
        assert_eq!(forecast_effort(42.0, 10.0, 0.0, 0.3, 0.05), 42.0);
        assert_eq!(forecast_effort(42.0, 99.0, -1.0, 0.0, -0.2), 42.0);
    }

    #[test]
    fn non_positive_sigma_is_floored() {
        let clamped = forecast_effort(100.0, 100.0, 1.0, 0.0, 0.05);
        let floor = forecast_effort(100.0, 100.0, 1.0, MIN_VOLATILITY, 0.05);
        assert_eq!(clamped, floor);
        assert_eq!(forecast_effort(100.0, 100.0, 1.0, -0.4, 0.05), floor);
        assert!((floor - 4.877_058).abs() < 1e-5, "got {floor}");
    }

    #[test]
    fn negative_efforts_propagate_nan() {
        assert!(forecast_effort(10.0, -5.0, 1.0, 0.2, 0.05).is_nan());
        assert!(forecast_effort(-10.0, 5.0, 1.0, 0.2, 0.05).is_nan());
    }

    #[test]
    fn d2_is_d1_minus_sigma_sqrt_t() {
        let (d1, d2) = d1_d2(50.0, 60.0, 0.25, 0.3, 0.02);
        assert!((d1 - d2 - 0.3 * 0.5).abs() < 1e-15);
    }

    #[test]
    fn cdf_choice_barely_moves_the_forecast() {
        let a = EffortForecaster::new(ZelenSevero).forecast(80.0, 75.0, 0.4, 0.25, 0.03);
        let b = EffortForecaster::new(ErfCdf).forecast(80.0, 75.0, 0.4, 0.25, 0.03);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn forecast_input_uses_all_fields() {
        let input = EstimationInput {
            current_estimate: 100.0,
            target_effort: 100.0,
            time_to_deadline: 1.0,
            volatility: 0.2,
            risk_free_rate: 0.05,
        };
        let v = EffortForecaster::<ZelenSevero>::default().forecast_input(&input);
        assert_eq!(v, forecast_effort(100.0, 100.0, 1.0, 0.2, 0.05));
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let a = forecast_effort(33.3, 41.0, 0.7, 0.31, 0.04);
        let b = forecast_effort(33.3, 41.0, 0.7, 0.31, 0.04);
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

//! Monte Carlo cross-check of the closed-form forecast.
//!
//! The effort is simulated as a geometric Brownian motion over the horizon,
//!
//! `S_T = S · exp((r − σ²/2)·T + σ·√T·Z)`, `Z ~ N(0, 1)`,
//!
//! and the forecast is the discounted mean of `max(S_T − K, 0)`. With enough
//! paths this converges to the closed form, which makes it a useful sanity
//! check when swapping CDF approximations.
//!
//! Runs are seeded so the same inputs always give the same estimate.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::EstimationInput;
use crate::error::AppError;
use crate::models::{effective_sigma, forecast_effort};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    /// Monte Carlo estimate of the forecast (hours).
    pub estimate: f64,
    /// Standard error of `estimate`.
    pub std_error: f64,
    pub paths: usize,
    /// Closed-form forecast for the same inputs.
    pub closed_form: f64,
}

impl SimulationResult {
    /// Gap between simulation and closed form, in standard errors.
    pub fn z_score(&self) -> f64 {
        if self.std_error > 0.0 {
            (self.estimate - self.closed_form) / self.std_error
        } else {
            0.0
        }
    }
}

pub fn simulate_forecast(input: &EstimationInput, paths: usize, seed: u64) -> Result<SimulationResult, AppError> {
    if paths < 2 {
        return Err(AppError::new(2, "Simulation needs at least 2 paths."));
    }
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(input.current_estimate) && positive(input.target_effort)) {
        return Err(AppError::new(2, "Current estimate and target must be > 0."));
    }
    if !input.time_to_deadline.is_finite() {
        return Err(AppError::new(2, "Deadline is not a number."));
    }
    if !(input.volatility.is_finite() && input.volatility >= 0.0) {
        return Err(AppError::new(2, "Volatility must be >= 0."));
    }
    if !input.risk_free_rate.is_finite() {
        return Err(AppError::new(2, "Risk-free rate must be a finite number."));
    }

    let closed_form = forecast_effort(
        input.current_estimate,
        input.target_effort,
        input.time_to_deadline,
        input.volatility,
        input.risk_free_rate,
    );

    // Mirrors the closed form's degenerate-horizon rule.
    if input.time_to_deadline <= 0.0 {
        return Ok(SimulationResult {
            estimate: input.current_estimate,
            std_error: 0.0,
            paths,
            closed_form,
        });
    }

    let s = input.current_estimate;
    let k = input.target_effort;
    let t = input.time_to_deadline;
    let r = input.risk_free_rate;
    let sigma = effective_sigma(input.volatility);

    let drift = (r - 0.5 * sigma * sigma) * t;
    let diffusion = sigma * t.sqrt();
    let discount = (-r * t).exp();

    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    // Welford running mean/variance of the discounted payoff.
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for i in 0..paths {
        let z: f64 = normal.sample(&mut rng);
        let s_t = s * (drift + diffusion * z).exp();
        let payoff = discount * (s_t - k).max(0.0);

        let delta = payoff - mean;
        mean += delta / (i + 1) as f64;
        m2 += delta * (payoff - mean);
    }

    let variance = m2 / (paths - 1) as f64;
    Ok(SimulationResult {
        estimate: mean,
        std_error: (variance / paths as f64).sqrt(),
        paths,
        closed_form,
    })
}

//! Standard normal distribution approximations.
//!
//! The forecaster only needs `Φ(x)`, so the CDF sits behind the `NormalCdf`
//! trait and the approximation can be swapped without touching the formula.
//!
//! Both implementations saturate outside `[-7, 7]`: beyond that range the
//! polynomial tails are no longer trustworthy and the true value is within
//! ~1.3e-12 of 0 or 1 anyway.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Beyond this |x| the CDF is reported as exactly 0 or 1.
pub const SATURATION: f64 = 7.0;

const GAMMA: f64 = 0.231_641_9;
const A1: f64 = 0.319_381_530;
const A2: f64 = -0.356_563_782;
const A3: f64 = 1.781_477_937;
const A4: f64 = -1.821_255_978;
const A5: f64 = 1.330_274_429;

/// Cumulative distribution function of the standard normal distribution.
pub trait NormalCdf {
    /// `P(Z <= x)` for `Z ~ N(0, 1)`.
    fn cdf(&self, x: f64) -> f64;
}

/// Zelen & Severo (Abramowitz & Stegun 26.2.17) polynomial approximation.
///
/// Absolute error is below 7.5e-8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZelenSevero;

/// `Φ(x) = (1 + erf(x / √2)) / 2` with the Abramowitz & Stegun 7.1.26 `erf`.
///
/// Absolute error is below 1.5e-7.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErfCdf;

impl NormalCdf for ZelenSevero {
    fn cdf(&self, x: f64) -> f64 {
        if x < -SATURATION {
            return 0.0;
        }
        if x > SATURATION {
            return 1.0;
        }

        let ax = x.abs();
        let t = 1.0 / (1.0 + GAMMA * ax);
        let poly = t * (A1 + t * (A2 + t * (A3 + t * (A4 + t * A5))));
        let upper = 1.0 - standard_normal_pdf(ax) * poly;

        if x < 0.0 { 1.0 - upper } else { upper }
    }
}

impl NormalCdf for ErfCdf {
    fn cdf(&self, x: f64) -> f64 {
        if x < -SATURATION {
            return 0.0;
        }
        if x > SATURATION {
            return 1.0;
        }
        (0.5 * (1.0 + erf(x * FRAC_1_SQRT_2))).clamp(0.0, 1.0)
    }
}

/// `Φ(x)` using the default (Zelen & Severo) approximation.
pub fn cumulative_distribution(x: f64) -> f64 {
    ZelenSevero.cdf(x)
}

/// Standard normal density `φ(x) = exp(-x²/2) / √(2π)`.
pub fn standard_normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Abramowitz & Stegun 7.1.26 error function approximation.
fn erf(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const E1: f64 = 0.254_829_592;
    const E2: f64 = -0.284_496_736;
    const E3: f64 = 1.421_413_741;
    const E4: f64 = -1.453_152_027;
    const E5: f64 = 1.061_405_429;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = t * (E1 + t * (E2 + t * (E3 + t * (E4 + t * E5))));
    sign * (1.0 - poly * (-x * x).exp())
}

//! Error types.
//!
//! - `EstimationError`: the two hard failures of the numeric core.
//! - `AppError`: what the `ef` binary reports (message + process exit code).
//!
//! Exit codes:
//! - `2`: usage / input problems (bad files, bad flags, no usable rows)
//! - `3`: the estimation core rejected its input
//! - `4`: internal or output failures

use thiserror::Error;

/// Hard failures raised by the volatility estimator.
///
/// Soft conditions (too few observations, degenerate sigma or horizon) never
/// show up here; they resolve to fallback values instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("invalid historical observations: {0}")]
    InvalidInput(String),

    #[error("planned and actual efforts differ in length ({planned} planned vs {actual} actual)")]
    LengthMismatch { planned: usize, actual: usize },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimationError> for AppError {
    fn from(err: EstimationError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimation_errors_map_to_exit_code_3() {
        let err: AppError = EstimationError::LengthMismatch { planned: 3, actual: 2 }.into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("3 planned vs 2 actual"));
    }
}

//! Numeric building blocks: the normal CDF and the volatility estimators.

pub mod normal;
pub mod volatility;

pub use normal::*;
pub use volatility::*;

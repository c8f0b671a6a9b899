//! The effort forecast formula and the risk classifier.
//!
//! Both are small, pure functions so the pipeline and the interactive prompt
//! can share them without any setup.

pub mod forecast;
pub mod risk;

pub use forecast::*;
pub use risk::*;

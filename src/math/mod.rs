//! Mathematical utilities: least squares and regression metrics.

pub mod metrics;
pub mod ols;

pub use metrics::*;
pub use ols::*;

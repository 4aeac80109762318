//! Property valuation.
//!
//! - per-city market statistics from the dataset (`market`)
//! - point estimate, market comparison and growth forecast (`engine`)

pub mod engine;
pub mod market;

pub use engine::*;
pub use market::*;

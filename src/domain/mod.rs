//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - enumerations of the categorical inputs (`City`, `LocationType`, `Furnishing`)
//! - the dataset row (`PropertyRecord`) and prediction input (`PropertyFeatures`)
//! - loan inputs and classifications (`LoanProfile`, `RiskCategory`, `Affordability`)

pub mod types;

pub use types::*;

//! Loan affordability.
//!
//! - EMI and yearly repayment schedule (`amortization`)
//! - DTI risk tiering, rate selection and affordability bands (`engine`)

pub mod amortization;
pub mod engine;

pub use amortization::*;
pub use engine::*;

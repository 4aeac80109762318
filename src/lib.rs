//! `homeworth` library crate.
//!
//! The binary (`homeworth`) is a thin wrapper around this library so that:
//!
//! - the engines are testable without spawning processes
//! - valuation and loan logic can be embedded behind other front-ends
//!
//! Data flow: `data` (synthetic sample) -> `io` (CSV) -> `fit` (train + evaluate)
//! -> `io` (model JSON) -> `valuation` / `loan` -> `report`.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod loan;
pub mod math;
pub mod models;
pub mod report;
pub mod valuation;

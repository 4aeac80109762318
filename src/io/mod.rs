//! Input/output helpers.
//!
//! - dataset CSV ingest + row validation (`ingest`)
//! - dataset CSV export (`export`)
//! - model artifact JSON read/write (`artifact`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;

//! Synthetic property data.

pub mod sample;

pub use sample::*;

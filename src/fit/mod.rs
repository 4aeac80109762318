//! Model training orchestration.
//!
//! - seeded train/test and k-fold splits (`split`)
//! - fit on the training part, score the hold-out part, cross-validate (`trainer`)

pub mod split;
pub mod trainer;

pub use split::*;
pub use trainer::*;

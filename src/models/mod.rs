//! Price models.
//!
//! - `encoder`: one-hot + passthrough column encoding
//! - `tree` / `forest`: regression trees and their bagged ensemble
//! - `linear`: least squares baseline
//! - `pipeline`: encoder and regressor composed behind `PricePredictor`

pub mod encoder;
pub mod forest;
pub mod linear;
pub mod pipeline;
pub mod tree;

pub use encoder::FeatureEncoder;
pub use forest::{ForestParams, RandomForest};
pub use linear::LinearRegression;
pub use pipeline::*;
pub use tree::{RegressionTree, TreeParams};

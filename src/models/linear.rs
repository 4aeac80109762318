//! Ordinary least squares baseline.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::solve_least_squares;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    pub fn fit(x: &DMatrix<f64>, y: &[f64]) -> Result<Self, EngineError> {
        if x.nrows() != y.len() || x.nrows() == 0 {
            return Err(EngineError::Training(format!(
                "feature rows ({}) and targets ({}) must match and be non-empty",
                x.nrows(),
                y.len()
            )));
        }

        let design = x.clone().insert_column(0, 1.0);
        let target = DVector::from_column_slice(y);
        let beta = solve_least_squares(&design, &target)
            .ok_or_else(|| EngineError::Training("least squares system is ill-conditioned".to_string()))?;

        Ok(Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn validate(&self, width: usize) -> Result<(), EngineError> {
        if self.coefficients.len() != width {
            return Err(EngineError::invalid(
                "linear model",
                format!("{} coefficients for {width} features", self.coefficients.len()),
            ));
        }
        Ok(())
    }

    pub fn predict_row(&self, row: &[f64]) -> Result<f64, EngineError> {
        if row.len() != self.coefficients.len() {
            return Err(EngineError::invalid(
                "encoded row",
                format!("expected {} features, got {}", self.coefficients.len(), row.len()),
            ));
        }
        Ok(self.intercept + row.iter().zip(&self.coefficients).map(|(x, b)| x * b).sum::<f64>())
    }
}

//! Regression error metrics.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Hold-out or per-fold error summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub n: usize,
}

impl RegressionMetrics {
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Result<Self, EngineError> {
        if actual.is_empty() {
            return Err(EngineError::invalid("evaluation set", "is empty"));
        }
        if actual.len() != predicted.len() {
            return Err(EngineError::invalid(
                "predictions",
                format!("expected {} values, got {}", actual.len(), predicted.len()),
            ));
        }

        let n = actual.len() as f64;
        let mean = actual.iter().sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut sse = 0.0;
        let mut sst = 0.0;
        for (&a, &p) in actual.iter().zip(predicted) {
            let e = a - p;
            abs_sum += e.abs();
            sse += e * e;
            sst += (a - mean) * (a - mean);
        }

        // A constant target has no variance to explain; report a perfect score
        // only when the predictions are exact.
        let r2 = if sst > 0.0 {
            1.0 - sse / sst
        } else if sse == 0.0 {
            1.0
        } else {
            0.0
        };

        let metrics = Self {
            mae: abs_sum / n,
            rmse: (sse / n).sqrt(),
            r2,
            n: actual.len(),
        };
        if !(metrics.mae.is_finite() && metrics.rmse.is_finite() && metrics.r2.is_finite()) {
            return Err(EngineError::NonFinite { what: "regression metric" });
        }
        Ok(metrics)
    }
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

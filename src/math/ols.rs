//! Least squares solver.
//!
//! Solves `minimize Σ (y_i - x_i^T β)^2` via SVD so that tall and
//! rank-deficient design matrices are handled. One-hot blocks plus an intercept
//! are always collinear (each block sums to the intercept column), so the
//! singular-value cutoff is taken relative to the largest singular value and
//! the returned β is the minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !(max_sv.is_finite() && max_sv > 0.0) {
        return None;
    }

    for &rel in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, max_sv * rel) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

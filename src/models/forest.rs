//! Random forest regressor.
//!
//! Each tree is grown on a bootstrap resample with its own `StdRng` seeded from
//! `seed + tree_index`, so results are identical whether trees are built in
//! parallel or not.

use nalgebra::DMatrix;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::tree::{RegressionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub tree: TreeParams,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            tree: TreeParams::default(),
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    /// Mean normalized impurity decrease per encoded feature (sums to 1).
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn fit(x: &DMatrix<f64>, y: &[f64], params: &ForestParams) -> Result<Self, EngineError> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(EngineError::Training(format!(
                "feature rows ({n_samples}) and targets ({}) differ",
                y.len()
            )));
        }
        if n_samples < 2 {
            return Err(EngineError::Training(format!("need at least 2 rows, got {n_samples}")));
        }
        if params.n_trees == 0 {
            return Err(EngineError::invalid("n_trees", "must be > 0"));
        }

        let grown: Vec<(RegressionTree, Vec<f64>)> = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let indices: Vec<usize> = if params.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                RegressionTree::fit(x, y, &indices, &params.tree, &mut rng)
            })
            .collect();

        let n_features = x.ncols();
        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(grown.len());
        for (tree, raw) in grown {
            let total: f64 = raw.iter().sum();
            if total > 0.0 {
                for (acc, v) in importances.iter_mut().zip(&raw) {
                    *acc += v / total;
                }
            }
            trees.push(tree);
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for v in &mut importances {
                *v /= total;
            }
        }

        Ok(Self {
            params: params.clone(),
            trees,
            importances,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Check every tree against the encoded row width.
    pub fn validate(&self, width: usize) -> Result<(), EngineError> {
        if self.trees.is_empty() {
            return Err(EngineError::NotFitted);
        }
        if self.importances.len() != width {
            return Err(EngineError::invalid(
                "forest",
                format!("{} importances for {width} features", self.importances.len()),
            ));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            if tree.n_features() != width {
                return Err(EngineError::invalid(
                    "forest",
                    format!("tree {idx} expects {} features, encoder produces {width}", tree.n_features()),
                ));
            }
            tree.validate()?;
        }
        Ok(())
    }

    /// Average of the per-tree predictions for one encoded row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, EngineError> {
        if self.trees.is_empty() {
            return Err(EngineError::NotFitted);
        }
        if let Some(tree) = self.trees.first() {
            if row.len() != tree.n_features() {
                return Err(EngineError::invalid(
                    "encoded row",
                    format!("expected {} features, got {}", tree.n_features(), row.len()),
                ));
            }
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

//! CART regression tree (squared-error splits).
//!
//! Nodes are stored in a flat vector with child indices, which keeps the
//! serialized form shallow regardless of tree depth.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split; `None` examines all of them.
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    n_features: usize,
}

struct Split {
    feature: usize,
    threshold: f64,
    children_sse: f64,
}

struct Builder<'a> {
    x: &'a DMatrix<f64>,
    y: &'a [f64],
    params: &'a TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
    /// Total squared-error decrease attributed to each feature.
    importances: Vec<f64>,
}

impl RegressionTree {
    /// Grow a tree on the rows listed in `indices` (duplicates allowed, as
    /// produced by bootstrap sampling).
    ///
    /// Returns the tree and the raw per-feature impurity decrease.
    pub fn fit(
        x: &DMatrix<f64>,
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> (Self, Vec<f64>) {
        let n_features = x.ncols();
        let mut builder = Builder {
            x,
            y,
            params,
            rng,
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };

        let mut work = indices.to_vec();
        if work.is_empty() {
            builder.nodes.push(Node::Leaf { value: 0.0 });
        } else {
            builder.grow(&mut work, 0);
        }

        let tree = Self {
            nodes: builder.nodes,
            n_features,
        };
        (tree, builder.importances)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    /// Check the structure of a deserialized tree before it is used.
    ///
    /// Children must point forward into the node vector, which also rules out
    /// cycles, and every split must read a column of an `n_features` row.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.nodes.is_empty() {
            return Err(EngineError::invalid("tree", "has no nodes"));
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            let Node::Split {
                feature, left, right, ..
            } = *node
            else {
                continue;
            };
            if feature >= self.n_features {
                return Err(EngineError::invalid(
                    "tree",
                    format!("node {idx} splits on feature {feature} of {}", self.n_features),
                ));
            }
            for child in [left, right] {
                if child <= idx || child >= len {
                    return Err(EngineError::invalid(
                        "tree",
                        format!("node {idx} points to child {child} (nodes: {len})"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Predict a single encoded row.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

impl Builder<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let node_idx = self.nodes.len();
        let n = indices.len();
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>() / n as f64;
        let sse: f64 = indices.iter().map(|&i| (self.y[i] - mean).powi(2)).sum();

        self.nodes.push(Node::Leaf { value: mean });

        let p = self.params;
        let depth_reached = p.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || n < p.min_samples_split || n < 2 * p.min_samples_leaf.max(1) || sse <= 0.0 {
            return node_idx;
        }

        let Some(split) = self.best_split(indices, mean, sse) else {
            return node_idx;
        };

        let mut mid = 0;
        for k in 0..n {
            if self.x[(indices[k], split.feature)] <= split.threshold {
                indices.swap(k, mid);
                mid += 1;
            }
        }
        self.importances[split.feature] += sse - split.children_sse;

        let (left_rows, right_rows) = indices.split_at_mut(mid);
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);

        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }

    /// Best squared-error split over the candidate features.
    ///
    /// Targets are centered on the node mean before accumulating prefix sums so
    /// the `sq - sum²/n` form stays well conditioned for rupee-scale prices.
    fn best_split(&mut self, indices: &[usize], mean: f64, sse: f64) -> Option<Split> {
        let n_features = self.x.ncols();
        let k = self.params.max_features.unwrap_or(n_features).clamp(1, n_features);
        let candidates: Vec<usize> = if k < n_features {
            index::sample(&mut *self.rng, n_features, k).into_vec()
        } else {
            (0..n_features).collect()
        };

        let min_leaf = self.params.min_samples_leaf.max(1);
        let n = indices.len();
        let mut best: Option<Split> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature in candidates {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (self.x[(i, feature)], self.y[i] - mean)));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total_sum: f64 = pairs.iter().map(|p| p.1).sum();
            let total_sq: f64 = pairs.iter().map(|p| p.1 * p.1).sum();

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let (value, r) = pairs[pos];
                left_sum += r;
                left_sq += r * r;

                let next = pairs[pos + 1].0;
                if value == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let children_sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.as_ref().is_none_or(|b| children_sse < b.children_sse) {
                    best = Some(Split {
                        feature,
                        threshold: value + (next - value) / 2.0,
                        children_sse,
                    });
                }
            }
        }

        best.filter(|b| b.children_sse < sse * (1.0 - 1e-12))
    }
}

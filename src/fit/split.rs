//! Seeded train/test and k-fold index splits.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::EngineError;

/// One cross-validation fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub index: usize,
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

fn shuffled(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    indices
}

/// Shuffle `0..n` and cut off `ceil(n * test_fraction)` rows for testing.
///
/// Returns `(train, test)`.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<(Vec<usize>, Vec<usize>), EngineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(EngineError::invalid("test fraction", format!("{test_fraction} is not in (0, 1)")));
    }
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(EngineError::invalid(
            "dataset",
            format!("{n} rows cannot be split with test fraction {test_fraction}"),
        ));
    }

    let indices = shuffled(n, seed);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    Ok((train, test))
}

/// Shuffled k-fold split; the first `n % k` folds get one extra row.
pub fn k_fold(n: usize, k: usize, seed: u64) -> Result<Vec<Fold>, EngineError> {
    if k < 2 {
        return Err(EngineError::invalid("cv folds", "must be at least 2"));
    }
    if n < k {
        return Err(EngineError::invalid("dataset", format!("{n} rows is fewer than {k} folds")));
    }

    let indices = shuffled(n, seed);
    let base = n / k;
    let remainder = n % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for index in 0..k {
        let size = if index < remainder { base + 1 } else { base };
        let end = start + size;
        let test = indices[start..end].to_vec();
        let train = indices[..start].iter().chain(&indices[end..]).copied().collect();
        folds.push(Fold { index, train, test });
        start = end;
    }
    Ok(folds)
}

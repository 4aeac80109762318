//! Training run: split, fit, evaluate, cross-validate.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{PropertyFeatures, PropertyRecord};
use crate::error::EngineError;
use crate::fit::split::{Fold, k_fold, train_test_split};
use crate::math::{RegressionMetrics, mean_std};
use crate::models::{FeatureImportance, ModelSettings, PricePipeline};

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub model: ModelSettings,
    pub test_fraction: f64,
    /// `0` disables cross-validation.
    pub cv_folds: usize,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: ModelSettings::default(),
            test_fraction: 0.2,
            cv_folds: 5,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidation {
    pub folds: Vec<RegressionMetrics>,
    pub r2_mean: f64,
    pub r2_std: f64,
    pub mae_mean: f64,
    pub mae_std: f64,
}

#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub pipeline: PricePipeline,
    pub n_train: usize,
    pub n_test: usize,
    pub holdout: RegressionMetrics,
    pub cross_validation: Option<CrossValidation>,
    pub importances: Option<Vec<FeatureImportance>>,
    pub grouped_importances: Option<Vec<FeatureImportance>>,
}

pub fn train(records: &[PropertyRecord], config: &TrainConfig) -> Result<TrainOutput, EngineError> {
    let (train_idx, test_idx) = train_test_split(records.len(), config.test_fraction, config.seed)?;
    let train_rows = select(records, &train_idx);
    let test_rows = select(records, &test_idx);

    info!(
        algorithm = ?config.model.algorithm,
        n_train = train_rows.len(),
        n_test = test_rows.len(),
        "fitting price model"
    );
    let pipeline = PricePipeline::fit(&train_rows, &config.model)?;
    let holdout = evaluate(&pipeline, &test_rows)?;
    info!(mae = holdout.mae, rmse = holdout.rmse, r2 = holdout.r2, "hold-out evaluation");

    let cross_validation = if config.cv_folds > 0 {
        let folds = k_fold(records.len(), config.cv_folds, config.seed)?;
        Some(cross_validate(records, &folds, &config.model)?)
    } else {
        None
    };

    Ok(TrainOutput {
        importances: pipeline.feature_importances(),
        grouped_importances: pipeline.grouped_importances(),
        pipeline,
        n_train: train_rows.len(),
        n_test: test_rows.len(),
        holdout,
        cross_validation,
    })
}

/// Score a fitted pipeline on labelled rows.
pub fn evaluate(pipeline: &PricePipeline, rows: &[PropertyRecord]) -> Result<RegressionMetrics, EngineError> {
    let features: Vec<PropertyFeatures> = rows.iter().map(PropertyRecord::features).collect();
    let predicted = pipeline.predict_many(&features)?;
    let actual: Vec<f64> = rows.iter().map(|r| r.price).collect();
    RegressionMetrics::compute(&actual, &predicted)
}

fn cross_validate(
    records: &[PropertyRecord],
    folds: &[Fold],
    settings: &ModelSettings,
) -> Result<CrossValidation, EngineError> {
    let metrics = folds
        .par_iter()
        .map(|fold| {
            let pipeline = PricePipeline::fit(&select(records, &fold.train), settings)?;
            let m = evaluate(&pipeline, &select(records, &fold.test))?;
            debug!(fold = fold.index, mae = m.mae, r2 = m.r2, "cross-validation fold");
            Ok(m)
        })
        .collect::<Result<Vec<RegressionMetrics>, EngineError>>()?;

    let r2: Vec<f64> = metrics.iter().map(|m| m.r2).collect();
    let mae: Vec<f64> = metrics.iter().map(|m| m.mae).collect();
    let (r2_mean, r2_std) = mean_std(&r2);
    let (mae_mean, mae_std) = mean_std(&mae);
    info!(folds = folds.len(), r2_mean, r2_std, "cross-validation");

    Ok(CrossValidation {
        folds: metrics,
        r2_mean,
        r2_std,
        mae_mean,
        mae_std,
    })
}

fn select(records: &[PropertyRecord], indices: &[usize]) -> Vec<PropertyRecord> {
    indices.iter().map(|&i| records[i].clone()).collect()
}

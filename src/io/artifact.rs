//! Read/write model artifact JSON files.
//!
//! The artifact is the portable form of a trained model: the fitted
//! [`PricePipeline`] (encoder and regressor together) plus the metadata of the
//! run that produced it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, PropertyFeatures};
use crate::error::{AppError, EngineError};
use crate::fit::{CrossValidation, TrainOutput};
use crate::io::export::ensure_parent_dir;
use crate::math::RegressionMetrics;
use crate::models::{PricePipeline, PricePredictor};

pub const TOOL_NAME: &str = "homeworth";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub tool: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub algorithm: Algorithm,
    pub feature_names: Vec<String>,
    pub n_train: usize,
    pub n_test: usize,
    pub holdout: RegressionMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_validation: Option<CrossValidation>,
    pub pipeline: PricePipeline,
}

impl ModelFile {
    pub fn from_training(output: &TrainOutput) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            algorithm: output.pipeline.algorithm(),
            feature_names: output.pipeline.encoder().feature_names(),
            n_train: output.n_train,
            n_test: output.n_test,
            holdout: output.holdout,
            cross_validation: output.cross_validation.clone(),
            pipeline: output.pipeline.clone(),
        }
    }
}

impl PricePredictor for ModelFile {
    fn predict(&self, features: &PropertyFeatures) -> Result<f64, EngineError> {
        self.pipeline.predict(features)
    }
}

pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, model)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush model JSON: {e}")))?;
    Ok(())
}

pub fn read_model_json(path: &Path) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Failed to open model JSON '{}': {e}. Run `homeworth train` first.",
                path.display()
            ),
        )
    })?;
    let model: ModelFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid model JSON '{}': {e}", path.display())))?;
    if model.tool != TOOL_NAME {
        return Err(AppError::new(
            2,
            format!("'{}' was written by '{}', not {TOOL_NAME}.", path.display(), model.tool),
        ));
    }
    model
        .pipeline
        .validate()
        .map_err(|e| AppError::new(2, format!("Corrupt model JSON '{}': {e}", path.display())))?;
    Ok(model)
}

//! The price pipeline: feature encoding composed with a regressor.
//!
//! A single [`PricePipeline`] value both encodes raw [`PropertyFeatures`] and
//! predicts, so the saved artifact is self-contained. Callers that only need
//! prices depend on the [`PricePredictor`] trait, which keeps the regression
//! algorithm swappable.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, PropertyFeatures, PropertyRecord};
use crate::error::EngineError;
use crate::models::encoder::FeatureEncoder;
use crate::models::forest::{ForestParams, RandomForest};
use crate::models::linear::LinearRegression;

/// Anything that can price a property.
pub trait PricePredictor: Send + Sync {
    fn predict(&self, features: &PropertyFeatures) -> Result<f64, EngineError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    pub algorithm: Algorithm,
    pub forest: ForestParams,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Forest,
            forest: ForestParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "lowercase")]
pub enum Regressor {
    Forest(RandomForest),
    Linear(LinearRegression),
}

/// Encoded feature with its share of the forest's impurity decrease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePipeline {
    encoder: FeatureEncoder,
    regressor: Regressor,
}

impl PricePipeline {
    pub fn fit(records: &[PropertyRecord], settings: &ModelSettings) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::Training("no training rows".to_string()));
        }
        let features: Vec<PropertyFeatures> = records.iter().map(PropertyRecord::features).collect();
        let target: Vec<f64> = records.iter().map(|r| r.price).collect();

        let encoder = FeatureEncoder::fit(&features);
        let x = encoder.encode(&features);

        let regressor = match settings.algorithm {
            Algorithm::Forest => Regressor::Forest(RandomForest::fit(&x, &target, &settings.forest)?),
            Algorithm::Linear => Regressor::Linear(LinearRegression::fit(&x, &target)?),
        };

        Ok(Self { encoder, regressor })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.regressor {
            Regressor::Forest(_) => Algorithm::Forest,
            Regressor::Linear(_) => Algorithm::Linear,
        }
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    /// Structural check for pipelines read back from disk.
    pub fn validate(&self) -> Result<(), EngineError> {
        let width = self.encoder.width();
        match &self.regressor {
            Regressor::Forest(forest) => forest.validate(width),
            Regressor::Linear(linear) => linear.validate(width),
        }
    }

    pub fn predict_many(&self, rows: &[PropertyFeatures]) -> Result<Vec<f64>, EngineError> {
        rows.par_iter().map(|row| self.predict(row)).collect()
    }

    /// Encoded features ranked by importance (forest only).
    pub fn feature_importances(&self) -> Option<Vec<FeatureImportance>> {
        let Regressor::Forest(forest) = &self.regressor else {
            return None;
        };
        let mut ranked: Vec<FeatureImportance> = self
            .encoder
            .feature_names()
            .into_iter()
            .zip(forest.feature_importances())
            .map(|(feature, &importance)| FeatureImportance { feature, importance })
            .collect();
        sort_desc(&mut ranked);
        Some(ranked)
    }

    /// Importances summed per source column (one-hot blocks collapsed).
    pub fn grouped_importances(&self) -> Option<Vec<FeatureImportance>> {
        let Regressor::Forest(forest) = &self.regressor else {
            return None;
        };
        let mut grouped: Vec<FeatureImportance> = Vec::new();
        for (source, &importance) in self.encoder.source_columns().into_iter().zip(forest.feature_importances()) {
            match grouped.iter_mut().find(|g| g.feature == source) {
                Some(g) => g.importance += importance,
                None => grouped.push(FeatureImportance {
                    feature: source,
                    importance,
                }),
            }
        }
        sort_desc(&mut grouped);
        Some(grouped)
    }
}

impl PricePredictor for PricePipeline {
    fn predict(&self, features: &PropertyFeatures) -> Result<f64, EngineError> {
        let row = self.encoder.encode_row(features);
        let price = match &self.regressor {
            Regressor::Forest(forest) => forest.predict_row(&row)?,
            Regressor::Linear(linear) => linear.predict_row(&row)?,
        };
        if !price.is_finite() {
            return Err(EngineError::NonFinite { what: "price prediction" });
        }
        Ok(price)
    }
}

fn sort_desc(items: &mut [FeatureImportance]) {
    items.sort_by(|a, b| b.importance.total_cmp(&a.importance).then_with(|| a.feature.cmp(&b.feature)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::{City, GeneratorVariant};

    fn training_rows(count: usize) -> Vec<PropertyRecord> {
        let config = SampleConfig {
            variant: GeneratorVariant::Basic,
            count,
            seed: 11,
        };
        generate_sample(&MarketConfig::default(), &config).unwrap()
    }

    fn small_forest() -> ModelSettings {
        ModelSettings {
            algorithm: Algorithm::Forest,
            forest: ForestParams {
                n_trees: 10,
                ..ForestParams::default()
            },
        }
    }

    #[test]
    fn forest_pipeline_predicts_finite_prices() {
        let rows = training_rows(300);
        let pipeline = PricePipeline::fit(&rows, &small_forest()).unwrap();
        assert_eq!(pipeline.algorithm(), Algorithm::Forest);

        let preds = pipeline.predict_many(&rows.iter().take(5).map(|r| r.features()).collect::<Vec<_>>()).unwrap();
        assert!(preds.iter().all(|p| p.is_finite() && *p > 0.0));
    }

    #[test]
    fn area_and_city_dominate_importance() {
        let rows = training_rows(400);
        let pipeline = PricePipeline::fit(&rows, &small_forest()).unwrap();
        let grouped = pipeline.grouped_importances().unwrap();
        assert_eq!(grouped.len(), 8);
        let total: f64 = grouped.iter().map(|g| g.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        let top_two: Vec<&str> = grouped.iter().take(2).map(|g| g.feature.as_str()).collect();
        assert!(top_two.contains(&"area_sqft"), "ranking {grouped:?}");
        assert!(top_two.contains(&"city"), "ranking {grouped:?}");

        let ranked = pipeline.feature_importances().unwrap();
        assert_eq!(ranked.len(), pipeline.encoder().width());
        assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn unseen_city_still_predicts() {
        let rows: Vec<PropertyRecord> = training_rows(300)
            .into_iter()
            .filter(|r| r.city != City::Lucknow)
            .collect();
        let pipeline = PricePipeline::fit(&rows, &small_forest()).unwrap();

        let mut features = rows[0].features();
        features.city = City::Lucknow;
        let price = pipeline.predict(&features).unwrap();
        assert!(price.is_finite());
    }

    #[test]
    fn linear_pipeline_has_no_importances() {
        let rows = training_rows(200);
        let settings = ModelSettings {
            algorithm: Algorithm::Linear,
            ..ModelSettings::default()
        };
        let pipeline = PricePipeline::fit(&rows, &settings).unwrap();
        assert_eq!(pipeline.algorithm(), Algorithm::Linear);
        assert!(pipeline.feature_importances().is_none());
        assert!(pipeline.predict(&rows[0].features()).unwrap().is_finite());
    }

    #[test]
    fn serde_round_trip_preserves_predictions() {
        let rows = training_rows(150);
        let pipeline = PricePipeline::fit(&rows, &small_forest()).unwrap();
        let json = serde_json::to_string(&pipeline).unwrap();
        let restored: PricePipeline = serde_json::from_str(&json).unwrap();
        let features = rows[3].features();
        let before = pipeline.predict(&features).unwrap();
        let after = restored.predict(&features).unwrap();
        assert!((before - after).abs() <= before.abs() * 1e-12);
    }
}

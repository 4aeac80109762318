//! Shared command workflows, free of printing.
//!
//! Each function runs one CLI command end to end and returns what the
//! front-end needs to render:
//! generate -> CSV, CSV -> train -> model JSON, model JSON + CSV -> estimate,
//! profile -> loan assessment.

use std::path::Path;

use tracing::info;

use crate::config::{Config, LoanPolicy, MarketConfig};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::{LoanProfile, PropertyFeatures, PropertyRecord};
use crate::error::AppError;
use crate::fit::{TrainConfig, TrainOutput, train};
use crate::io::{Dataset, ModelFile, load_dataset, read_model_json, write_dataset_csv, write_model_json};
use crate::loan::{AmortizationYear, LoanAssessment, LoanEngine, amortization_schedule};
use crate::valuation::{MarketIndex, Valuation, ValuationEngine};

/// All computed outputs of a single `homeworth train` run.
#[derive(Debug, Clone)]
pub struct TrainRun {
    pub dataset: Dataset,
    pub output: TrainOutput,
    pub model: ModelFile,
}

#[derive(Debug, Clone)]
pub struct LoanRun {
    pub assessment: LoanAssessment,
    pub schedule: Option<Vec<AmortizationYear>>,
}

/// Generate a dataset and write it to `output`.
pub fn run_generate(
    market: &MarketConfig,
    sample: &SampleConfig,
    output: &Path,
) -> Result<Vec<PropertyRecord>, AppError> {
    let records = generate_sample(market, sample)?;
    write_dataset_csv(output, &records)?;
    info!(
        rows = records.len(),
        variant = ?sample.variant,
        seed = sample.seed,
        path = %output.display(),
        "dataset written"
    );
    Ok(records)
}

/// Load the dataset, train, and save the model artifact.
pub fn run_train(data: &Path, model_path: &Path, config: &TrainConfig) -> Result<TrainRun, AppError> {
    let dataset = load_dataset(data)?;
    let output = train(&dataset.records, config)?;
    let model = ModelFile::from_training(&output);
    write_model_json(model_path, &model)?;
    info!(path = %model_path.display(), "model saved");

    Ok(TrainRun { dataset, output, model })
}

/// Price one property with a saved model and the dataset's market ranges.
pub fn run_estimate(
    model_path: &Path,
    data: &Path,
    config: &Config,
    features: &PropertyFeatures,
    horizons: &[u32],
) -> Result<Valuation, AppError> {
    let model = read_model_json(model_path)?;
    let dataset = load_dataset(data)?;

    let engine = ValuationEngine::new(
        Box::new(model),
        MarketIndex::from_records(&dataset.records),
        config.market.growth.clone(),
        config.bounds.clone(),
    )
    .with_horizons(horizons.to_vec());
    Ok(engine.estimate(features)?)
}

pub fn run_loan(policy: &LoanPolicy, profile: &LoanProfile, with_schedule: bool) -> Result<LoanRun, AppError> {
    let engine = LoanEngine::new(policy.clone());
    let assessment = engine.evaluate(profile)?;
    let schedule = if with_schedule {
        Some(amortization_schedule(
            profile.loan_amount,
            assessment.interest_rate,
            profile.tenure_years,
        )?)
    } else {
        None
    };
    Ok(LoanRun { assessment, schedule })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{City, EmploymentType, Furnishing, GeneratorVariant, LocationType};
    use crate::models::{ForestParams, ModelSettings};

    #[test]
    fn generate_train_estimate_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data/housing_data.csv");
        let model = dir.path().join("models/house_price_model.json");
        let config = Config::default();

        let sample = SampleConfig {
            count: 800,
            ..SampleConfig::new(GeneratorVariant::Refined)
        };
        let records = run_generate(&config.market, &sample, &data).unwrap();
        assert_eq!(records.len(), 800);

        let train_config = TrainConfig {
            model: ModelSettings {
                forest: ForestParams {
                    n_trees: 10,
                    ..ForestParams::default()
                },
                ..ModelSettings::default()
            },
            cv_folds: 0,
            ..TrainConfig::default()
        };
        let run = run_train(&data, &model, &train_config).unwrap();
        assert_eq!(run.dataset.records.len(), 800);
        assert!(model.exists());

        let features = PropertyFeatures {
            city: City::Pune,
            area_sqft: 1000,
            bhk: 2,
            bathrooms: 2,
            parking: true,
            location_type: LocationType::Standard,
            property_age: 5,
            furnishing: Furnishing::SemiFurnished,
        };
        let valuation = run_estimate(&model, &data, &config, &features, &[0, 5]).unwrap();
        assert!(valuation.predicted_price.is_finite());
        assert_eq!(valuation.forecast[0].value, valuation.predicted_price);
        assert!(valuation.market_range.is_some());
    }

    #[test]
    fn estimate_without_model_fails_with_code_2() {
        let dir = tempfile::tempdir().unwrap();
        let features = PropertyFeatures {
            city: City::Delhi,
            area_sqft: 900,
            bhk: 2,
            bathrooms: 1,
            parking: false,
            location_type: LocationType::Premium,
            property_age: 0,
            furnishing: Furnishing::Furnished,
        };
        let err = run_estimate(
            &dir.path().join("missing.json"),
            &dir.path().join("missing.csv"),
            &Config::default(),
            &features,
            &[3],
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn loan_run_attaches_schedule_on_request() {
        let profile = LoanProfile {
            age: 35,
            monthly_income: 120_000.0,
            employment: EmploymentType::Business,
            existing_emi: 0.0,
            loan_amount: 5_000_000.0,
            tenure_years: 15,
        };
        let policy = LoanPolicy::default();
        assert!(run_loan(&policy, &profile, false).unwrap().schedule.is_none());
        let run = run_loan(&policy, &profile, true).unwrap();
        assert_eq!(run.schedule.map(|s| s.len()), Some(15));
    }

    #[test]
    fn zero_income_maps_to_exit_code_3() {
        let profile = LoanProfile {
            age: 35,
            monthly_income: 0.0,
            employment: EmploymentType::Salaried,
            existing_emi: 0.0,
            loan_amount: 1_000_000.0,
            tenure_years: 10,
        };
        let err = run_loan(&LoanPolicy::default(), &profile, false).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}

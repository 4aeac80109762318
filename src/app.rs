//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments and the optional config file
//! - runs the requested command and prints its report

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, EstimateArgs, GenerateArgs, LoanArgs, TrainArgs};
use crate::config::Config;
use crate::data::SampleConfig;
use crate::domain::{LoanProfile, PropertyFeatures};
use crate::error::AppError;
use crate::fit::TrainConfig;
use crate::models::{ForestParams, ModelSettings, TreeParams};

pub mod pipeline;

/// Entry point for the `homeworth` binary.
pub fn run() -> Result<(), AppError> {
    // Before parsing so `.env` values feed clap's `env` defaults.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Generate(args) => handle_generate(&args, &config),
        Command::Train(args) => handle_train(&args),
        Command::Estimate(args) => handle_estimate(&args, &config),
        Command::Loan(args) => handle_loan(&args, &config),
    }
}

/// Logs go to stderr so stdout carries only the report or JSON.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "homeworth=info".into()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_generate(args: &GenerateArgs, config: &Config) -> Result<(), AppError> {
    let sample = sample_config_from_args(args);
    let records = pipeline::run_generate(&config.market, &sample, &args.output)?;

    if args.output_mode.json {
        let doc = serde_json::json!({
            "output": args.output.display().to_string(),
            "variant": sample.variant,
            "seed": sample.seed,
            "rows": records.len(),
        });
        println!("{}", crate::report::to_json(&doc)?);
    } else {
        println!("{}", crate::report::format_generate_summary(&args.output, &records));
    }
    Ok(())
}

fn handle_train(args: &TrainArgs) -> Result<(), AppError> {
    let train_config = train_config_from_args(args);
    let run = pipeline::run_train(&args.data, &args.model, &train_config)?;

    if args.output_mode.json {
        let doc = serde_json::json!({
            "model": args.model.display().to_string(),
            "algorithm": run.output.pipeline.algorithm(),
            "rows_used": run.dataset.records.len(),
            "rows_skipped": run.dataset.row_errors.len(),
            "n_train": run.output.n_train,
            "n_test": run.output.n_test,
            "holdout": run.output.holdout,
            "cross_validation": run.output.cross_validation,
            "feature_importance": run.output.grouped_importances,
        });
        println!("{}", crate::report::to_json(&doc)?);
    } else {
        println!(
            "{}",
            crate::report::format_training_summary(&run.dataset, &run.output, &args.model, args.top)
        );
    }
    Ok(())
}

fn handle_estimate(args: &EstimateArgs, config: &Config) -> Result<(), AppError> {
    let features = features_from_args(args);
    let valuation = pipeline::run_estimate(&args.model, &args.data, config, &features, &args.years)?;

    if args.output_mode.json {
        let doc = serde_json::json!({ "features": features, "valuation": valuation });
        println!("{}", crate::report::to_json(&doc)?);
    } else {
        println!("{}", crate::report::format_valuation(&features, &valuation));
    }
    Ok(())
}

fn handle_loan(args: &LoanArgs, config: &Config) -> Result<(), AppError> {
    let profile = profile_from_args(args);
    let run = pipeline::run_loan(&config.loan, &profile, args.schedule)?;

    if args.output_mode.json {
        let doc = serde_json::json!({
            "profile": profile,
            "assessment": run.assessment,
            "schedule": run.schedule,
        });
        println!("{}", crate::report::to_json(&doc)?);
    } else {
        println!(
            "{}",
            crate::report::format_loan(&profile, &run.assessment, run.schedule.as_deref())
        );
    }
    Ok(())
}

pub fn sample_config_from_args(args: &GenerateArgs) -> SampleConfig {
    SampleConfig {
        variant: args.variant,
        count: args.count.unwrap_or_else(|| args.variant.default_count()),
        seed: args.seed,
    }
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        model: ModelSettings {
            algorithm: args.algorithm,
            forest: ForestParams {
                n_trees: args.trees,
                tree: TreeParams {
                    max_depth: args.max_depth,
                    min_samples_split: args.min_samples_split,
                    min_samples_leaf: args.min_samples_leaf,
                    ..TreeParams::default()
                },
                seed: args.seed,
                ..ForestParams::default()
            },
        },
        test_fraction: args.test_fraction,
        cv_folds: args.cv_folds,
        seed: args.seed,
    }
}

pub fn features_from_args(args: &EstimateArgs) -> PropertyFeatures {
    PropertyFeatures {
        city: args.city,
        area_sqft: args.area,
        bhk: args.bhk,
        bathrooms: args.bathrooms,
        parking: args.parking,
        location_type: args.location,
        property_age: args.age,
        furnishing: args.furnishing,
    }
}

pub fn profile_from_args(args: &LoanArgs) -> LoanProfile {
    LoanProfile {
        age: args.age,
        monthly_income: args.income,
        employment: args.employment,
        existing_emi: args.existing_emi,
        loan_amount: args.amount,
        tenure_years: args.tenure,
    }
}

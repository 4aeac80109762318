//! Command-line parsing for the HomeWorth estimator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! engines; `app` turns these structs into engine inputs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Algorithm, City, EmploymentType, Furnishing, GeneratorVariant, LocationType};

pub const DEFAULT_DATA_PATH: &str = "data/housing_data.csv";
pub const DEFAULT_MODEL_PATH: &str = "models/house_price_model.json";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "homeworth",
    version,
    about = "Indian property price estimator and home-loan affordability checker"
)]
pub struct Cli {
    /// JSON file overriding market tables, input bounds and loan policy.
    #[arg(long, global = true, env = "HOMEWORTH_CONFIG", value_name = "JSON")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic property dataset CSV.
    Generate(GenerateArgs),
    /// Train the price model on a dataset CSV and save it.
    Train(TrainArgs),
    /// Estimate a property's price, market range and future value.
    Estimate(EstimateArgs),
    /// Assess a borrower's risk tier, rate, EMI and affordability.
    Loan(LoanArgs),
}

/// Shared output switch.
#[derive(Debug, Args, Clone, Copy)]
pub struct OutputArgs {
    /// Print the result as JSON instead of a text report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Generator recipe.
    #[arg(long, value_enum, default_value_t = GeneratorVariant::Refined)]
    pub variant: GeneratorVariant,

    /// Number of rows (default 3000 basic / 5000 refined).
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short, long, env = "HOMEWORTH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub output: PathBuf,

    #[command(flatten)]
    pub output_mode: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct TrainArgs {
    /// Dataset CSV.
    #[arg(short, long, env = "HOMEWORTH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Where to write the model JSON.
    #[arg(short, long, env = "HOMEWORTH_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    #[arg(long, value_enum, default_value_t = Algorithm::Forest)]
    pub algorithm: Algorithm,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Maximum tree depth (unlimited when omitted).
    #[arg(long)]
    pub max_depth: Option<usize>,

    #[arg(long, default_value_t = 2)]
    pub min_samples_split: usize,

    #[arg(long, default_value_t = 1)]
    pub min_samples_leaf: usize,

    /// Share of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Cross-validation folds (0 disables).
    #[arg(long, default_value_t = 5)]
    pub cv_folds: usize,

    /// Seed for the split, bootstrap samples and folds.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Show the top-N encoded features by importance.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    #[command(flatten)]
    pub output_mode: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Trained model JSON.
    #[arg(short, long, env = "HOMEWORTH_MODEL", default_value = DEFAULT_MODEL_PATH)]
    pub model: PathBuf,

    /// Dataset CSV used for the market range.
    #[arg(short, long, env = "HOMEWORTH_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    #[arg(long, value_enum)]
    pub city: City,

    /// Built-up area in square feet.
    #[arg(long)]
    pub area: u32,

    #[arg(long)]
    pub bhk: u32,

    #[arg(long)]
    pub bathrooms: u32,

    /// The property has a parking spot.
    #[arg(long)]
    pub parking: bool,

    #[arg(long, value_enum, default_value_t = LocationType::Standard)]
    pub location: LocationType,

    /// Property age in years.
    #[arg(long, default_value_t = 0)]
    pub age: u32,

    #[arg(long, value_enum, default_value_t = Furnishing::Unfurnished)]
    pub furnishing: Furnishing,

    /// Forecast horizons in years.
    #[arg(long, value_delimiter = ',', default_values_t = [3u32, 5, 7])]
    pub years: Vec<u32>,

    #[command(flatten)]
    pub output_mode: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct LoanArgs {
    /// Borrower age in years.
    #[arg(long)]
    pub age: u32,

    /// Monthly income in rupees.
    #[arg(long)]
    pub income: f64,

    #[arg(long, value_enum, default_value_t = EmploymentType::Salaried)]
    pub employment: EmploymentType,

    /// Monthly installments already being paid.
    #[arg(long, default_value_t = 0.0)]
    pub existing_emi: f64,

    /// Requested principal in rupees.
    #[arg(long)]
    pub amount: f64,

    /// Tenure in years.
    #[arg(long, default_value_t = 20)]
    pub tenure: u32,

    /// Print the yearly repayment schedule.
    #[arg(long)]
    pub schedule: bool,

    #[command(flatten)]
    pub output_mode: OutputArgs,
}

//! Lookup tables and policy thresholds.
//!
//! Every constant the generator, valuation and loan engines depend on lives in
//! [`Config`] and is passed in explicitly. Defaults are compiled in; a JSON file
//! may set any subset of fields and missing fields keep their defaults. A table
//! (a city or category map) given in the file replaces the default table in
//! full, so it must list every key the commands will look up.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{City, Furnishing, LocationType, RiskCategory};
use crate::error::{AppError, EngineError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub market: MarketConfig,
    pub bounds: FeatureBounds,
    pub loan: LoanPolicy,
}

impl Config {
    /// Load a config file, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::open(path)
            .map_err(|e| AppError::new(2, format!("Failed to open config '{}': {e}", path.display())))?;
        let config: Config = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid config '{}': {e}", path.display())))?;
        config.loan.validate()?;
        Ok(config)
    }
}

/// Pricing tables used by the generator and the growth projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub base_price_per_sqft: BTreeMap<City, f64>,
    pub location_multiplier: BTreeMap<LocationType, f64>,
    pub furnishing_bonus: BTreeMap<Furnishing, f64>,
    pub structural: StructuralRates,
    /// Per-city multiplier applied by the refined generator.
    pub volatility: BTreeMap<City, f64>,
    pub growth: GrowthTable,
}

impl Default for MarketConfig {
    fn default() -> Self {
        let base_price_per_sqft = BTreeMap::from([
            (City::Mumbai, 18_000.0),
            (City::Delhi, 15_000.0),
            (City::Bengaluru, 12_000.0),
            (City::Pune, 8_000.0),
            (City::Hyderabad, 7_000.0),
            (City::Chennai, 7_500.0),
            (City::Kolkata, 6_000.0),
            (City::Ahmedabad, 5_500.0),
            (City::Jaipur, 5_000.0),
            (City::Lucknow, 4_500.0),
        ]);
        let location_multiplier = BTreeMap::from([
            (LocationType::Premium, 1.3),
            (LocationType::Standard, 1.0),
            (LocationType::Developing, 0.8),
        ]);
        let furnishing_bonus = BTreeMap::from([
            (Furnishing::Furnished, 500_000.0),
            (Furnishing::SemiFurnished, 250_000.0),
            (Furnishing::Unfurnished, 0.0),
        ]);
        let volatility = BTreeMap::from([
            (City::Mumbai, 1.10),
            (City::Delhi, 1.08),
            (City::Bengaluru, 1.06),
            (City::Pune, 1.04),
            (City::Hyderabad, 1.05),
            (City::Chennai, 1.03),
            (City::Kolkata, 1.00),
            (City::Ahmedabad, 1.02),
            (City::Jaipur, 0.98),
            (City::Lucknow, 0.97),
        ]);

        Self {
            base_price_per_sqft,
            location_multiplier,
            furnishing_bonus,
            structural: StructuralRates::default(),
            volatility,
            growth: GrowthTable::default(),
        }
    }
}

impl MarketConfig {
    pub fn base_price(&self, city: City) -> Result<f64, EngineError> {
        lookup(&self.base_price_per_sqft, city, "base price")
    }

    pub fn location_multiplier(&self, location: LocationType) -> Result<f64, EngineError> {
        lookup(&self.location_multiplier, location, "location multiplier")
    }

    pub fn furnishing_bonus(&self, furnishing: Furnishing) -> Result<f64, EngineError> {
        lookup(&self.furnishing_bonus, furnishing, "furnishing bonus")
    }

    pub fn volatility(&self, city: City) -> Result<f64, EngineError> {
        lookup(&self.volatility, city, "volatility")
    }
}

/// Fixed per-unit price contributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralRates {
    pub per_bhk: f64,
    pub per_bathroom: f64,
    pub parking: f64,
    /// Subtracted once per year of age.
    pub per_year_of_age: f64,
}

impl Default for StructuralRates {
    fn default() -> Self {
        Self {
            per_bhk: 200_000.0,
            per_bathroom: 100_000.0,
            parking: 150_000.0,
            per_year_of_age: 50_000.0,
        }
    }
}

/// Annual compounding growth rate per city (decimal, `0.08` = 8 %).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowthTable {
    rates: BTreeMap<City, f64>,
}

impl Default for GrowthTable {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (City::Mumbai, 0.065),
            (City::Delhi, 0.060),
            (City::Bengaluru, 0.090),
            (City::Pune, 0.080),
            (City::Hyderabad, 0.085),
            (City::Chennai, 0.065),
            (City::Kolkata, 0.055),
            (City::Ahmedabad, 0.075),
            (City::Jaipur, 0.060),
            (City::Lucknow, 0.070),
        ]))
    }
}

impl GrowthTable {
    pub fn new(rates: BTreeMap<City, f64>) -> Self {
        Self { rates }
    }

    pub fn rate(&self, city: City) -> Result<f64, EngineError> {
        lookup(&self.rates, city, "growth rate")
    }
}

/// Accepted ranges for valuation inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureBounds {
    pub area_min: u32,
    pub area_max: u32,
    pub bhk_max: u32,
    pub bathrooms_max: u32,
    pub age_max: u32,
    /// Longest accepted forecast horizon in years.
    pub max_horizon_years: u32,
}

impl Default for FeatureBounds {
    fn default() -> Self {
        Self {
            area_min: 200,
            area_max: 10_000,
            bhk_max: 5,
            bathrooms_max: 5,
            age_max: 100,
            max_horizon_years: 50,
        }
    }
}

/// One DTI band of the risk ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTier {
    pub category: RiskCategory,
    /// Exclusive upper DTI bound; `None` marks the catch-all tier.
    pub max_dti: Option<f64>,
    /// Annual interest rate range in percent.
    pub rate_min: f64,
    pub rate_max: f64,
}

impl RiskTier {
    pub fn rate(&self) -> f64 {
        (self.rate_min + self.rate_max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanPolicy {
    /// Ordered from lowest to highest DTI.
    pub tiers: Vec<RiskTier>,
    /// EMI-to-income below this is comfortable.
    pub comfortable_below: f64,
    /// EMI-to-income below this is manageable; anything above is risky.
    pub manageable_below: f64,
    /// Loan-to-income multiple above which an advisory note is emitted.
    pub max_lti: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub min_tenure_years: u32,
    pub max_tenure_years: u32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        let tier = |category, max_dti, rate_min, rate_max| RiskTier {
            category,
            max_dti,
            rate_min,
            rate_max,
        };
        Self {
            tiers: vec![
                tier(RiskCategory::Excellent, Some(0.30), 8.0, 9.0),
                tier(RiskCategory::Good, Some(0.45), 9.0, 10.5),
                tier(RiskCategory::Fair, Some(0.55), 10.5, 12.0),
                tier(RiskCategory::Poor, None, 12.0, 14.0),
            ],
            comfortable_below: 0.30,
            manageable_below: 0.45,
            max_lti: 6.0,
            min_age: 18,
            max_age: 75,
            min_tenure_years: 1,
            max_tenure_years: 30,
        }
    }
}

impl LoanPolicy {
    /// Reject policies whose tier ladder cannot classify every DTI.
    pub fn validate(&self) -> Result<(), AppError> {
        let Some(last) = self.tiers.last() else {
            return Err(AppError::new(2, "Loan policy needs at least one risk tier."));
        };
        if last.max_dti.is_some() {
            return Err(AppError::new(2, "The last risk tier must have no max_dti."));
        }
        let bounds: Vec<f64> = self.tiers.iter().filter_map(|t| t.max_dti).collect();
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(AppError::new(2, "Risk tier max_dti values must be finite."));
        }
        if bounds.len() != self.tiers.len() - 1 || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AppError::new(2, "Risk tier max_dti values must be strictly increasing."));
        }
        if self.tiers.iter().any(|t| !(t.rate_min >= 0.0 && t.rate_max >= t.rate_min)) {
            return Err(AppError::new(2, "Risk tier rate ranges must satisfy 0 <= min <= max."));
        }
        if !(self.comfortable_below.is_finite() && self.manageable_below.is_finite())
            || self.comfortable_below > self.manageable_below
        {
            return Err(AppError::new(
                2,
                "comfortable_below and manageable_below must be finite and ordered.",
            ));
        }
        if self.min_age > self.max_age {
            return Err(AppError::new(2, "min_age must not exceed max_age."));
        }
        if self.min_tenure_years > self.max_tenure_years {
            return Err(AppError::new(2, "min_tenure_years must not exceed max_tenure_years."));
        }
        if self.max_tenure_years.checked_mul(12).is_none() {
            return Err(AppError::new(
                2,
                format!("max_tenure_years {} is too large.", self.max_tenure_years),
            ));
        }
        Ok(())
    }
}

fn lookup<K>(map: &BTreeMap<K, f64>, key: K, table: &'static str) -> Result<f64, EngineError>
where
    K: Ord + Display,
{
    map.get(&key).copied().ok_or_else(|| EngineError::MissingTableEntry {
        table,
        key: key.to_string(),
    })
}

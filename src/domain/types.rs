//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - sampled by the generator and written to the dataset CSV
//! - read back for training and market-range statistics
//! - printed as JSON by the CLI

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The fixed set of cities covered by the dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum City {
    Mumbai,
    Delhi,
    Bengaluru,
    Pune,
    Hyderabad,
    Chennai,
    Kolkata,
    Ahmedabad,
    Jaipur,
    Lucknow,
}

impl City {
    pub const ALL: [City; 10] = [
        City::Mumbai,
        City::Delhi,
        City::Bengaluru,
        City::Pune,
        City::Hyderabad,
        City::Chennai,
        City::Kolkata,
        City::Ahmedabad,
        City::Jaipur,
        City::Lucknow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            City::Mumbai => "Mumbai",
            City::Delhi => "Delhi",
            City::Bengaluru => "Bengaluru",
            City::Pune => "Pune",
            City::Hyderabad => "Hyderabad",
            City::Chennai => "Chennai",
            City::Kolkata => "Kolkata",
            City::Ahmedabad => "Ahmedabad",
            City::Jaipur => "Jaipur",
            City::Lucknow => "Lucknow",
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Neighbourhood grade of a property.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum LocationType {
    Premium,
    Standard,
    Developing,
}

impl LocationType {
    pub const ALL: [LocationType; 3] = [
        LocationType::Premium,
        LocationType::Standard,
        LocationType::Developing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LocationType::Premium => "Premium",
            LocationType::Standard => "Standard",
            LocationType::Developing => "Developing",
        }
    }
}

impl std::fmt::Display for LocationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Furnishing {
    Furnished,
    #[serde(rename = "Semi-Furnished")]
    SemiFurnished,
    Unfurnished,
}

impl Furnishing {
    pub const ALL: [Furnishing; 3] = [
        Furnishing::Furnished,
        Furnishing::SemiFurnished,
        Furnishing::Unfurnished,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Furnishing::Furnished => "Furnished",
            Furnishing::SemiFurnished => "Semi-Furnished",
            Furnishing::Unfurnished => "Unfurnished",
        }
    }
}

impl std::fmt::Display for Furnishing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the dataset CSV.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub city: City,
    pub area_sqft: u32,
    pub bhk: u32,
    pub bathrooms: u32,
    /// `0` or `1`.
    pub parking: u8,
    pub location_type: LocationType,
    pub property_age: u32,
    pub furnishing: Furnishing,
    pub price: f64,
}

impl PropertyRecord {
    pub const COLUMNS: [&'static str; 9] = [
        "city",
        "area_sqft",
        "bhk",
        "bathrooms",
        "parking",
        "location_type",
        "property_age",
        "furnishing",
        "price",
    ];

    /// The record without its price.
    pub fn features(&self) -> PropertyFeatures {
        PropertyFeatures {
            city: self.city,
            area_sqft: self.area_sqft,
            bhk: self.bhk,
            bathrooms: self.bathrooms,
            parking: self.parking != 0,
            location_type: self.location_type,
            property_age: self.property_age,
            furnishing: self.furnishing,
        }
    }
}

/// Prediction input: a property description without a price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFeatures {
    pub city: City,
    pub area_sqft: u32,
    pub bhk: u32,
    pub bathrooms: u32,
    pub parking: bool,
    pub location_type: LocationType,
    pub property_age: u32,
    pub furnishing: Furnishing,
}

/// Which generator recipe to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorVariant {
    /// Uniform areas, independent room counts, no noise.
    Basic,
    /// Normal areas, room counts derived from area, multiplicative noise and
    /// per-city volatility.
    Refined,
}

impl GeneratorVariant {
    pub fn default_count(self) -> usize {
        match self {
            GeneratorVariant::Basic => 3000,
            GeneratorVariant::Refined => 5000,
        }
    }
}

/// Regression algorithm behind the price pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Bagged ensemble of regression trees.
    Forest,
    /// Ordinary least squares on the encoded features.
    Linear,
}

impl Algorithm {
    pub fn display_name(self) -> &'static str {
        match self {
            Algorithm::Forest => "Random forest",
            Algorithm::Linear => "Linear least squares",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum EmploymentType {
    Salaried,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Business,
}

impl EmploymentType {
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentType::Salaried => "Salaried",
            EmploymentType::SelfEmployed => "Self-Employed",
            EmploymentType::Business => "Business",
        }
    }
}

/// Borrower inputs for an affordability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProfile {
    pub age: u32,
    pub monthly_income: f64,
    pub employment: EmploymentType,
    /// Monthly installments already being paid on other loans.
    pub existing_emi: f64,
    pub loan_amount: f64,
    pub tenure_years: u32,
}

/// Borrower risk tier, ordered from lowest to highest risk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RiskCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RiskCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskCategory::Excellent => "Excellent",
            RiskCategory::Good => "Good",
            RiskCategory::Fair => "Fair",
            RiskCategory::Poor => "Poor",
        }
    }
}

/// How heavy the new installment is relative to income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affordability {
    Comfortable,
    Manageable,
    Risky,
}

impl Affordability {
    pub fn as_str(self) -> &'static str {
        match self {
            Affordability::Comfortable => "Comfortable",
            Affordability::Manageable => "Manageable",
            Affordability::Risky => "Risky",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_features_drop_price_and_map_parking() {
        let record = PropertyRecord {
            city: City::Pune,
            area_sqft: 1000,
            bhk: 2,
            bathrooms: 2,
            parking: 1,
            location_type: LocationType::Standard,
            property_age: 5,
            furnishing: Furnishing::SemiFurnished,
            price: 9_000_000.0,
        };
        let features = record.features();
        assert!(features.parking);
        assert_eq!(features.city, City::Pune);
        assert_eq!(features.furnishing.as_str(), "Semi-Furnished");
    }

    #[test]
    fn risk_categories_are_ordered_by_risk() {
        assert!(RiskCategory::Excellent < RiskCategory::Good);
        assert!(RiskCategory::Fair < RiskCategory::Poor);
    }

    #[test]
    fn furnishing_serializes_with_hyphen() {
        let json = serde_json::to_string(&Furnishing::SemiFurnished).unwrap();
        assert_eq!(json, "\"Semi-Furnished\"");
    }
}

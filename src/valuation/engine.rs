//! Point estimate, market comparison and growth forecast for one property.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FeatureBounds, GrowthTable};
use crate::domain::{City, PropertyFeatures};
use crate::error::EngineError;
use crate::models::PricePredictor;
use crate::valuation::market::{MarketIndex, MarketRange};

pub const DEFAULT_HORIZONS: [u32; 3] = [3, 5, 7];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub years: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub city: City,
    pub predicted_price: f64,
    pub market_range: Option<MarketRange>,
    /// `None` when there is no market range to compare against.
    pub within_market_range: Option<bool>,
    pub growth_rate: f64,
    pub forecast: Vec<ForecastPoint>,
}

/// Compound growth: `price * (1 + rate)^years`.
pub fn project(price: f64, annual_rate: f64, years: u32) -> Result<f64, EngineError> {
    let exponent = i32::try_from(years).map_err(|_| EngineError::invalid("years", format!("{years} is too large")))?;
    let value = price * (1.0 + annual_rate).powi(exponent);
    if !value.is_finite() {
        return Err(EngineError::NonFinite { what: "forecast" });
    }
    Ok(value)
}

pub struct ValuationEngine {
    predictor: Box<dyn PricePredictor>,
    market: MarketIndex,
    growth: GrowthTable,
    bounds: FeatureBounds,
    horizons: Vec<u32>,
}

impl ValuationEngine {
    pub fn new(
        predictor: Box<dyn PricePredictor>,
        market: MarketIndex,
        growth: GrowthTable,
        bounds: FeatureBounds,
    ) -> Self {
        Self {
            predictor,
            market,
            growth,
            bounds,
            horizons: DEFAULT_HORIZONS.to_vec(),
        }
    }

    pub fn with_horizons(mut self, horizons: Vec<u32>) -> Self {
        self.horizons = horizons;
        self
    }

    pub fn estimate(&self, features: &PropertyFeatures) -> Result<Valuation, EngineError> {
        validate_features(features, &self.bounds)?;
        validate_horizons(&self.horizons, &self.bounds)?;
        let growth_rate = self.growth.rate(features.city)?;

        let predicted_price = self.predictor.predict(features)?;
        if !predicted_price.is_finite() {
            return Err(EngineError::NonFinite { what: "price prediction" });
        }

        let market_range = self.market.range(features.city).copied();
        let within_market_range = market_range.map(|r| r.contains(predicted_price));
        let forecast = self
            .horizons
            .iter()
            .map(|&years| {
                Ok(ForecastPoint {
                    years,
                    value: project(predicted_price, growth_rate, years)?,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        debug!(city = %features.city, predicted_price, ?within_market_range, "valuation");
        Ok(Valuation {
            city: features.city,
            predicted_price,
            market_range,
            within_market_range,
            growth_rate,
            forecast,
        })
    }
}

/// Reject property descriptions outside the configured bounds.
pub fn validate_features(features: &PropertyFeatures, bounds: &FeatureBounds) -> Result<(), EngineError> {
    if !(bounds.area_min..=bounds.area_max).contains(&features.area_sqft) {
        return Err(EngineError::invalid(
            "area_sqft",
            format!(
                "{} is outside {}..={}",
                features.area_sqft, bounds.area_min, bounds.area_max
            ),
        ));
    }
    if !(1..=bounds.bhk_max).contains(&features.bhk) {
        return Err(EngineError::invalid(
            "bhk",
            format!("{} is outside 1..={}", features.bhk, bounds.bhk_max),
        ));
    }
    if !(1..=bounds.bathrooms_max).contains(&features.bathrooms) {
        return Err(EngineError::invalid(
            "bathrooms",
            format!("{} is outside 1..={}", features.bathrooms, bounds.bathrooms_max),
        ));
    }
    if features.property_age > bounds.age_max {
        return Err(EngineError::invalid(
            "property_age",
            format!("{} exceeds {}", features.property_age, bounds.age_max),
        ));
    }
    Ok(())
}

fn validate_horizons(horizons: &[u32], bounds: &FeatureBounds) -> Result<(), EngineError> {
    match horizons.iter().find(|&&y| y > bounds.max_horizon_years) {
        Some(years) => Err(EngineError::invalid(
            "years",
            format!("{years} exceeds {}", bounds.max_horizon_years),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::MarketConfig;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::{Furnishing, GeneratorVariant, LocationType, PropertyRecord};
    use crate::models::{ForestParams, ModelSettings, PricePipeline};

    struct FixedPrice(f64);

    impl PricePredictor for FixedPrice {
        fn predict(&self, _features: &PropertyFeatures) -> Result<f64, EngineError> {
            Ok(self.0)
        }
    }

    fn pune_flat() -> PropertyFeatures {
        PropertyFeatures {
            city: City::Pune,
            area_sqft: 1000,
            bhk: 2,
            bathrooms: 2,
            parking: true,
            location_type: LocationType::Standard,
            property_age: 5,
            furnishing: Furnishing::SemiFurnished,
        }
    }

    fn engine(price: f64, records: &[PropertyRecord]) -> ValuationEngine {
        ValuationEngine::new(
            Box::new(FixedPrice(price)),
            MarketIndex::from_records(records),
            GrowthTable::default(),
            FeatureBounds::default(),
        )
    }

    fn engine_with_horizons(horizons: Vec<u32>) -> ValuationEngine {
        engine(5_000_000.0, &[]).with_horizons(horizons)
    }

    #[test]
    fn zero_years_is_identity_for_every_city() {
        let growth = GrowthTable::default();
        for city in City::ALL {
            let rate = growth.rate(city).unwrap();
            assert_eq!(project(7_654_321.0, rate, 0).unwrap(), 7_654_321.0);
        }
    }

    #[test]
    fn forecast_grows_with_horizon() {
        let engine = engine(10_000_000.0, &[]).with_horizons(vec![1, 3, 5, 7, 10]);
        let v = engine.estimate(&pune_flat()).unwrap();
        assert_eq!(v.growth_rate, 0.08);
        assert!(v.forecast.windows(2).all(|w| w[1].value > w[0].value));
        assert!((v.forecast[0].value - 10_800_000.0).abs() < 1e-6);
        assert!(v.market_range.is_none());
        assert!(v.within_market_range.is_none());
    }

    #[test]
    fn default_horizons_are_three_five_seven() {
        let v = engine(5_000_000.0, &[]).estimate(&pune_flat()).unwrap();
        let years: Vec<u32> = v.forecast.iter().map(|f| f.years).collect();
        assert_eq!(years, vec![3, 5, 7]);
    }

    #[test]
    fn out_of_bounds_inputs_are_rejected() {
        let engine = engine(5_000_000.0, &[]);
        let mut f = pune_flat();
        f.area_sqft = 50;
        assert!(matches!(
            engine.estimate(&f),
            Err(EngineError::InvalidInput { field: "area_sqft", .. })
        ));
        let mut f = pune_flat();
        f.bhk = 0;
        assert!(engine.estimate(&f).is_err());
        let mut f = pune_flat();
        f.property_age = 150;
        assert!(engine.estimate(&f).is_err());
    }

    #[test]
    fn horizons_beyond_the_bound_are_rejected() {
        let engine = engine(5_000_000.0, &[]).with_horizons(vec![5, 10_000, 3_000_000_000]);
        assert!(matches!(
            engine.estimate(&pune_flat()),
            Err(EngineError::InvalidInput { field: "years", .. })
        ));

        let max = FeatureBounds::default().max_horizon_years;
        let v = engine_with_horizons(vec![max]).estimate(&pune_flat()).unwrap();
        assert!(v.forecast[0].value.is_finite());
    }

    #[test]
    fn overflowing_projection_is_not_returned() {
        assert_eq!(
            project(5_000_000.0, 0.08, 10_000),
            Err(EngineError::NonFinite { what: "forecast" })
        );
        assert!(matches!(
            project(5_000_000.0, 0.08, 3_000_000_000),
            Err(EngineError::InvalidInput { field: "years", .. })
        ));
    }

    #[test]
    fn missing_growth_rate_is_an_error() {
        let engine = ValuationEngine::new(
            Box::new(FixedPrice(5_000_000.0)),
            MarketIndex::default(),
            GrowthTable::new(BTreeMap::from([(City::Mumbai, 0.065)])),
            FeatureBounds::default(),
        );
        assert!(matches!(
            engine.estimate(&pune_flat()),
            Err(EngineError::MissingTableEntry { table: "growth rate", .. })
        ));
    }

    #[test]
    fn non_finite_prediction_is_an_error() {
        let engine = engine(f64::NAN, &[]);
        assert_eq!(
            engine.estimate(&pune_flat()),
            Err(EngineError::NonFinite { what: "price prediction" })
        );
    }

    #[test]
    fn trained_model_prices_pune_flat_within_observed_range() {
        let sample = SampleConfig {
            count: 1500,
            ..SampleConfig::new(GeneratorVariant::Refined)
        };
        let records = generate_sample(&MarketConfig::default(), &sample).unwrap();
        let settings = ModelSettings {
            forest: ForestParams {
                n_trees: 15,
                ..ForestParams::default()
            },
            ..ModelSettings::default()
        };
        let pipeline = PricePipeline::fit(&records, &settings).unwrap();
        let engine = ValuationEngine::new(
            Box::new(pipeline),
            MarketIndex::from_records(&records),
            GrowthTable::default(),
            FeatureBounds::default(),
        );

        let v = engine.estimate(&pune_flat()).unwrap();
        let range = v.market_range.unwrap();
        assert!(range.count > 0);
        assert!(range.contains(v.predicted_price), "{} not in {range:?}", v.predicted_price);
        assert_eq!(v.within_market_range, Some(true));
    }
}

//! Per-city price statistics from the historical dataset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{City, PropertyRecord};

/// Observed prices for one city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketRange {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

impl MarketRange {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketIndex {
    ranges: BTreeMap<City, MarketRange>,
}

impl MarketIndex {
    pub fn from_records(records: &[PropertyRecord]) -> Self {
        let mut acc: BTreeMap<City, (f64, f64, f64, usize)> = BTreeMap::new();
        for r in records.iter().filter(|r| r.price.is_finite()) {
            let e = acc
                .entry(r.city)
                .or_insert((f64::INFINITY, f64::NEG_INFINITY, 0.0, 0));
            e.0 = e.0.min(r.price);
            e.1 = e.1.max(r.price);
            e.2 += r.price;
            e.3 += 1;
        }

        let ranges = acc
            .into_iter()
            .map(|(city, (min, max, sum, count))| {
                let range = MarketRange {
                    min,
                    mean: sum / count as f64,
                    max,
                    count,
                };
                (city, range)
            })
            .collect();
        Self { ranges }
    }

    /// `None` when the dataset holds no rows for `city`.
    pub fn range(&self, city: City) -> Option<&MarketRange> {
        self.ranges.get(&city)
    }

    pub fn cities(&self) -> impl Iterator<Item = City> + '_ {
        self.ranges.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Furnishing, LocationType};

    fn row(city: City, price: f64) -> PropertyRecord {
        PropertyRecord {
            city,
            area_sqft: 1000,
            bhk: 2,
            bathrooms: 2,
            parking: 0,
            location_type: LocationType::Standard,
            property_age: 1,
            furnishing: Furnishing::Unfurnished,
            price,
        }
    }

    #[test]
    fn ranges_are_per_city() {
        let index = MarketIndex::from_records(&[
            row(City::Pune, 6_000_000.0),
            row(City::Pune, 9_000_000.0),
            row(City::Mumbai, 20_000_000.0),
        ]);
        let pune = index.range(City::Pune).unwrap();
        assert_eq!((pune.min, pune.max, pune.count), (6_000_000.0, 9_000_000.0, 2));
        assert_eq!(pune.mean, 7_500_000.0);
        assert!(pune.contains(7_000_000.0));
        assert!(!pune.contains(9_000_001.0));
        assert!(index.range(City::Delhi).is_none());
        assert_eq!(index.cities().collect::<Vec<_>>(), vec![City::Mumbai, City::Pune]);
    }
}

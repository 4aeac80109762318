//! Column encoding for property features.
//!
//! Layout of an encoded row:
//!
//! ```text
//! [ city one-hot | location_type one-hot | furnishing one-hot | area_sqft bhk bathrooms parking property_age ]
//! ```
//!
//! Categories are learned from the training rows (sorted). A value that was not
//! seen during fitting encodes as an all-zero block instead of failing.

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::PropertyFeatures;

pub const CATEGORICAL_COLUMNS: [&str; 3] = ["city", "location_type", "furnishing"];
pub const NUMERIC_COLUMNS: [&str; 5] = ["area_sqft", "bhk", "bathrooms", "parking", "property_age"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    categorical: Vec<CategoricalColumn>,
    numeric: Vec<String>,
}

impl FeatureEncoder {
    pub fn fit(rows: &[PropertyFeatures]) -> Self {
        let mut seen: [BTreeSet<&'static str>; 3] = Default::default();
        for row in rows {
            for (set, value) in seen.iter_mut().zip(categorical_values(row)) {
                set.insert(value);
            }
        }

        let categorical = CATEGORICAL_COLUMNS
            .iter()
            .zip(seen)
            .map(|(name, set)| CategoricalColumn {
                name: name.to_string(),
                categories: set.into_iter().map(str::to_string).collect(),
            })
            .collect();

        Self {
            categorical,
            numeric: NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of encoded columns.
    pub fn width(&self) -> usize {
        self.categorical.iter().map(|c| c.categories.len()).sum::<usize>() + self.numeric.len()
    }

    /// Encoded column names (`city=Pune`, ..., `area_sqft`).
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width());
        for col in &self.categorical {
            for cat in &col.categories {
                names.push(format!("{}={}", col.name, cat));
            }
        }
        names.extend(self.numeric.iter().cloned());
        names
    }

    /// Source column of each encoded column, parallel to [`Self::feature_names`].
    pub fn source_columns(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.width());
        for col in &self.categorical {
            out.extend(std::iter::repeat(col.name.clone()).take(col.categories.len()));
        }
        out.extend(self.numeric.iter().cloned());
        out
    }

    pub fn encode_row(&self, features: &PropertyFeatures) -> Vec<f64> {
        let mut out = vec![0.0; self.width()];
        let mut offset = 0;
        for (col, value) in self.categorical.iter().zip(categorical_values(features)) {
            if let Some(pos) = col.categories.iter().position(|c| c == value) {
                out[offset + pos] = 1.0;
            }
            offset += col.categories.len();
        }
        for (slot, value) in out[offset..].iter_mut().zip(numeric_values(features)) {
            *slot = value;
        }
        out
    }

    pub fn encode(&self, rows: &[PropertyFeatures]) -> DMatrix<f64> {
        let width = self.width();
        let mut data = Vec::with_capacity(rows.len() * width);
        for row in rows {
            data.extend(self.encode_row(row));
        }
        DMatrix::from_row_slice(rows.len(), width, &data)
    }
}

fn categorical_values(f: &PropertyFeatures) -> [&'static str; 3] {
    [f.city.as_str(), f.location_type.as_str(), f.furnishing.as_str()]
}

fn numeric_values(f: &PropertyFeatures) -> [f64; 5] {
    [
        f.area_sqft as f64,
        f.bhk as f64,
        f.bathrooms as f64,
        if f.parking { 1.0 } else { 0.0 },
        f.property_age as f64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{City, Furnishing, LocationType};

    fn features(city: City, location_type: LocationType, furnishing: Furnishing) -> PropertyFeatures {
        PropertyFeatures {
            city,
            area_sqft: 1100,
            bhk: 2,
            bathrooms: 1,
            parking: true,
            location_type,
            property_age: 3,
            furnishing,
        }
    }

    #[test]
    fn one_hot_blocks_precede_numeric_passthrough() {
        let rows = vec![
            features(City::Pune, LocationType::Standard, Furnishing::Furnished),
            features(City::Delhi, LocationType::Premium, Furnishing::Unfurnished),
        ];
        let encoder = FeatureEncoder::fit(&rows);
        assert_eq!(encoder.width(), 2 + 2 + 2 + 5);
        assert_eq!(
            encoder.feature_names(),
            vec![
                "city=Delhi",
                "city=Pune",
                "location_type=Premium",
                "location_type=Standard",
                "furnishing=Furnished",
                "furnishing=Unfurnished",
                "area_sqft",
                "bhk",
                "bathrooms",
                "parking",
                "property_age",
            ]
        );

        let row = encoder.encode_row(&rows[0]);
        assert_eq!(row, vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1100.0, 2.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn unseen_category_encodes_as_zero_block() {
        let rows = vec![features(City::Pune, LocationType::Standard, Furnishing::Furnished)];
        let encoder = FeatureEncoder::fit(&rows);

        let unseen = features(City::Lucknow, LocationType::Developing, Furnishing::SemiFurnished);
        let row = encoder.encode_row(&unseen);
        assert_eq!(&row[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&row[3..], &[1100.0, 2.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn matrix_rows_match_encode_row() {
        let rows = vec![
            features(City::Pune, LocationType::Standard, Furnishing::Furnished),
            features(City::Jaipur, LocationType::Developing, Furnishing::SemiFurnished),
        ];
        let encoder = FeatureEncoder::fit(&rows);
        let m = encoder.encode(&rows);
        assert_eq!(m.nrows(), 2);
        for (i, row) in rows.iter().enumerate() {
            let expected = encoder.encode_row(row);
            for (j, v) in expected.iter().enumerate() {
                assert_eq!(m[(i, j)], *v);
            }
        }
        assert_eq!(encoder.source_columns().len(), encoder.width());
    }
}

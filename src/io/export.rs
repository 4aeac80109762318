//! Write generated datasets to CSV.
//!
//! The column order matches [`PropertyRecord::COLUMNS`] so the file can be fed
//! straight back into `train`.

use std::fs::{self, File};
use std::path::Path;

use crate::domain::PropertyRecord;
use crate::error::AppError;

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", dir.display()))),
        _ => Ok(()),
    }
}

pub fn write_dataset_csv(path: &Path, records: &[PropertyRecord]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset CSV '{}': {e}", path.display())))?;

    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::new(2, format!("Failed to write dataset row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush dataset CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketConfig;
    use crate::data::{SampleConfig, generate_sample};
    use crate::domain::GeneratorVariant;
    use crate::io::ingest::load_dataset;

    #[test]
    fn written_dataset_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/housing.csv");
        let config = SampleConfig {
            count: 50,
            ..SampleConfig::new(GeneratorVariant::Refined)
        };
        let records = generate_sample(&MarketConfig::default(), &config).unwrap();

        write_dataset_csv(&path, &records).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(&PropertyRecord::COLUMNS.join(",")));

        let loaded = load_dataset(&path).unwrap();
        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.records.len(), 50);
        for (a, b) in loaded.records.iter().zip(&records) {
            assert_eq!(a.features(), b.features());
            assert!((a.price - b.price).abs() <= b.price.abs() * 1e-12);
        }
    }
}

//! Dataset CSV ingest.
//!
//! Turns the dataset CSV into [`PropertyRecord`]s.
//!
//! - **Strict header** check for the nine dataset columns (exit code 2)
//! - **Row-level tolerance**: rows that fail to parse are skipped and reported
//! - **Fatal when empty**: zero usable rows is exit code 3

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::PropertyRecord;
use crate::error::AppError;

/// Summary stats about the rows actually loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub price_min: f64,
    pub price_max: f64,
    pub price_mean: f64,
    pub cities: usize,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<PropertyRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub stats: DatasetStats,
}

/// Load the dataset CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dataset '{}': {e}", path.display())))?;
    let dataset = read_dataset(file)?;
    info!(
        path = %path.display(),
        rows = dataset.records.len(),
        skipped = dataset.row_errors.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Parse a dataset from any reader.
pub fn read_dataset<R: Read>(input: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let raw_headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let headers: StringRecord = raw_headers.iter().map(normalize_header_name).collect();
    ensure_required_columns_exist(&headers)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &headers));
        match parsed {
            Ok(row) => records.push(row),
            Err(message) => {
                warn!(line, %message, "skipping dataset row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let stats = compute_stats(&records)
        .ok_or_else(|| AppError::new(3, format!("No usable rows in dataset ({rows_read} read).")))?;

    Ok(Dataset {
        records,
        row_errors,
        rows_read,
        stats,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn ensure_required_columns_exist(headers: &StringRecord) -> Result<(), AppError> {
    let missing: Vec<&str> = PropertyRecord::COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("Missing required column(s): {}", missing.join(", ")),
        ))
    }
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<PropertyRecord, String> {
    let row: PropertyRecord = record.deserialize(Some(headers)).map_err(|e| e.to_string())?;
    if !row.price.is_finite() {
        return Err(format!("price '{}' is not finite", row.price));
    }
    Ok(row)
}

fn compute_stats(records: &[PropertyRecord]) -> Option<DatasetStats> {
    if records.is_empty() {
        return None;
    }
    let mut price_min = f64::INFINITY;
    let mut price_max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut per_city: HashMap<_, usize> = HashMap::new();
    for r in records {
        price_min = price_min.min(r.price);
        price_max = price_max.max(r.price);
        sum += r.price;
        *per_city.entry(r.city).or_default() += 1;
    }
    Some(DatasetStats {
        price_min,
        price_max,
        price_mean: sum / records.len() as f64,
        cities: per_city.len(),
    })
}

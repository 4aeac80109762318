//! Reporting: terminal text and JSON documents for each command.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::error::AppError;

/// Pretty JSON for `--json` output.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::new(4, format!("Failed to encode JSON output: {e}")))
}

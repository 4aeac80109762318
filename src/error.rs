use thiserror::Error;

/// Application-level failure: a message plus the process exit code it maps to.
///
/// Exit codes:
/// - `2` invalid input, configuration or file I/O
/// - `3` no usable data / undefined ratio
/// - `4` computation failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Errors raised by the valuation, loan and training engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("{ratio} ratio is undefined: monthly income is zero")]
    UndefinedRatio { ratio: &'static str },

    #[error("no entry for '{key}' in {table} table")]
    MissingTableEntry { table: &'static str, key: String },

    #[error("non-finite {what}")]
    NonFinite { what: &'static str },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("training failed: {0}")]
    Training(String),
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let code = match err {
            EngineError::InvalidInput { .. } | EngineError::MissingTableEntry { .. } => 2,
            EngineError::UndefinedRatio { .. } => 3,
            EngineError::NonFinite { .. } | EngineError::NotFitted | EngineError::Training(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let undefined: AppError = EngineError::UndefinedRatio { ratio: "debt-to-income" }.into();
        assert_eq!(undefined.exit_code(), 3);
        assert!(undefined.to_string().contains("debt-to-income"));

        let invalid: AppError = EngineError::invalid("bhk", "must be between 1 and 5").into();
        assert_eq!(invalid.exit_code(), 2);

        let unfitted: AppError = EngineError::NotFitted.into();
        assert_eq!(unfitted.exit_code(), 4);
    }
}

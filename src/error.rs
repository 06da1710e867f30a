//! Error types for Screentime Insights

use thiserror::Error;

/// Errors that can occur while loading, scoring, or reporting on screen-time data
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Malformed record at row {row}: field `{field}` {reason}")]
    MalformedRecord {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No data available for {0}")]
    NoData(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Access denied: invalid username or password")]
    AccessDenied,
}

impl ComputeError {
    pub(crate) fn malformed(row: usize, field: &str, reason: impl Into<String>) -> Self {
        ComputeError::MalformedRecord {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error concerns a single input row rather than the whole dataset
    pub fn is_row_level(&self) -> bool {
        matches!(self, ComputeError::MalformedRecord { .. })
    }
}

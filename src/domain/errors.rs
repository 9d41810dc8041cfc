//! Domain error types
//!
//! This module defines the error hierarchy for pufgen. Anonymization failures
//! are typed so callers can decide whether to abort the batch or just the
//! table that raised them. Third-party error types are flattened into strings.

use thiserror::Error;

/// Main pufgen error type
#[derive(Debug, Error)]
pub enum PufError {
    /// An anonymization parameter is out of range (e.g. `k < 2`)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A column declares a semantic type with no generalization policy
    #[error("Unsupported semantic type: {0}")]
    UnsupportedType(String),

    /// A column's length disagrees with the accumulator's row count
    #[error(
        "Row count mismatch for {table}.{column}: accumulator has {expected} rows, column has {actual}"
    )]
    RowCountMismatch {
        table: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backing store errors (connection, query, load)
    #[error("Database error: {0}")]
    Database(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// CSV framing errors on source files or accumulator generations
    #[error("CSV error: {0}")]
    Csv(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A table worker panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PufError {
    /// Whether the error must abort the whole run rather than a single table
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PufError::InvalidParameter(_)
                | PufError::UnsupportedType(_)
                | PufError::Configuration(_)
        )
    }
}

impl From<std::io::Error> for PufError {
    fn from(err: std::io::Error) -> Self {
        PufError::Io(err.to_string())
    }
}

impl From<csv::Error> for PufError {
    fn from(err: csv::Error) -> Self {
        PufError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for PufError {
    fn from(err: serde_json::Error) -> Self {
        PufError::Other(format!("JSON error: {err}"))
    }
}

impl From<toml::de::Error> for PufError {
    fn from(err: toml::de::Error) -> Self {
        PufError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<tokio::task::JoinError> for PufError {
    fn from(err: tokio::task::JoinError) -> Self {
        PufError::Worker(err.to_string())
    }
}

impl From<tokio_postgres::Error> for PufError {
    fn from(err: tokio_postgres::Error) -> Self {
        PufError::Database(err.to_string())
    }
}

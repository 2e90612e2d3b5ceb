//! Error types for the bagel library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bagel operations.
#[derive(Debug, Error)]
pub enum BagelError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing TSV data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A required column is absent from an input table.
    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error writing pipeline outputs.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl BagelError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BagelError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for bagel operations.
pub type Result<T> = std::result::Result<T, BagelError>;

//! Loaded participants tables and their provenance.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::schema::StorageType;

/// Metadata about the source table file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// A single column of a participants table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    /// Header as written in the file.
    pub name: String,
    /// Storage type decided at load time.
    pub storage: StorageType,
    /// Cell values; `None` marks a missing value.
    pub values: Vec<Option<String>>,
}

impl TableColumn {
    /// Create a column with generic storage.
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            storage: StorageType::Object,
            values,
        }
    }

    /// Set the storage type.
    pub fn with_storage(mut self, storage: StorageType) -> Self {
        self.storage = storage;
        self
    }

    /// Non-missing values, in row order.
    pub fn non_missing(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|v| v.as_deref())
    }

    /// Returns true if any value is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }

    /// Returns true if every value is missing.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Distinct non-missing values in first-seen order.
    ///
    /// Numeric columns are compared by value so that `"01"` and `"1"` are one
    /// level, the same way a typed column would hold them.
    pub fn unique_values(&self) -> IndexSet<String> {
        self.non_missing()
            .map(|v| canonical_value(self.storage, v))
            .collect()
    }

    /// Number of distinct values, with all missing cells counted as one.
    pub fn distinct_count(&self) -> usize {
        self.unique_values().len() + usize::from(self.has_missing())
    }
}

fn canonical_value(storage: StorageType, value: &str) -> String {
    let trimmed = value.trim();
    match storage {
        StorageType::Int64 => trimmed
            .parse::<i64>()
            .map(|n| n.to_string())
            .unwrap_or_else(|_| value.to_string()),
        StorageType::Float64 => trimmed
            .parse::<f64>()
            .map(|n| n.to_string())
            .unwrap_or_else(|_| value.to_string()),
        _ => value.to_string(),
    }
}

/// A participants table loaded column-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantsTable {
    /// Columns in file order.
    pub columns: Vec<TableColumn>,
    /// Number of data rows.
    pub row_count: usize,
}

impl ParticipantsTable {
    /// Create a table from its columns.
    pub fn new(columns: Vec<TableColumn>, row_count: usize) -> Self {
        Self { columns, row_count }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Column headers in file order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

//! TSV loader with storage-type and date detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::source::{ParticipantsTable, SourceMetadata, TableColumn};
use crate::error::{BagelError, Result};
use crate::inference::DateDetector;
use crate::schema::StorageType;

/// Strings read as missing values, matching the common dataframe defaults.
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character.
    pub quote: u8,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Cell values treated as missing.
    pub na_values: Vec<String>,
    /// Whether to reclassify generic columns holding only dates.
    pub detect_dates: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            quote: b'"',
            max_rows: None,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            detect_dates: true,
        }
    }
}

/// Loads participants tables.
pub struct Parser {
    config: ParserConfig,
    dates: DateDetector,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            dates: DateDetector::new(),
        }
    }

    /// Parse a file and return the table and its metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(ParticipantsTable, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| BagelError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let table = self.parse_bytes(&contents)?;

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParticipantsTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.config.delimiter)
            .quote(self.config.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(BagelError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); expected_cols];
        let mut row_count = 0;

        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            // Header row is line 1, so data starts at line 2.
            if record.len() > expected_cols {
                return Err(BagelError::Parse {
                    row: row_idx + 2,
                    column: record.len(),
                    message: format!(
                        "expected {} fields, saw {}",
                        expected_cols,
                        record.len()
                    ),
                });
            }

            for (col_idx, column) in cells.iter_mut().enumerate() {
                let value = record.get(col_idx).filter(|v| !self.is_missing(v));
                column.push(value.map(String::from));
            }
            row_count += 1;
        }

        let mut columns: Vec<TableColumn> = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| {
                let column = TableColumn::new(name, values);
                let storage = detect_storage(&column);
                column.with_storage(storage)
            })
            .collect();

        if self.config.detect_dates {
            for column in columns.iter_mut().filter(|c| c.storage.is_generic()) {
                if self.dates.is_date_column(column) {
                    debug!(column = %column.name, "reclassified as datetime");
                    column.storage = StorageType::DateTime;
                }
            }
        }

        Ok(ParticipantsTable::new(columns, row_count))
    }

    fn is_missing(&self, value: &str) -> bool {
        self.config.na_values.iter().any(|na| na == value)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide the concrete storage a column can be held in.
///
/// Columns without any non-missing value stay generic.
fn detect_storage(column: &TableColumn) -> StorageType {
    if column.is_empty() {
        return StorageType::Object;
    }

    let all = |f: fn(&str) -> bool| column.non_missing().all(|v| f(v.trim()));

    if all(|v| v.parse::<i64>().is_ok()) {
        StorageType::Int64
    } else if all(|v| v.parse::<f64>().is_ok()) {
        StorageType::Float64
    } else if all(|v| matches!(v, "True" | "False" | "TRUE" | "FALSE" | "true" | "false")) {
        StorageType::Bool
    } else {
        StorageType::Object
    }
}

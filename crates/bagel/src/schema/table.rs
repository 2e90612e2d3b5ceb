//! The bulk annotation output tables.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{BagelError, Result};

use super::column::{ColumnDescriptor, LevelRecord, NOT_AVAILABLE};

/// One row of `bulk_annotation_levels.tsv`.
///
/// Header rows (`is_row == true`) describe a column; level rows describe one
/// value of the column named in the preceding header row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelsRow {
    pub dataset: String,
    pub nb_rows: usize,
    pub column: String,
    pub value: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nb_levels: usize,
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub is_row: bool,
    pub description: String,
    pub controlled_term: String,
    pub units: String,
    pub term_url: String,
}

impl LevelsRow {
    /// Header row for a column.
    pub fn header(column: &ColumnDescriptor) -> Self {
        Self {
            dataset: column.dataset.clone(),
            nb_rows: column.nb_rows,
            column: column.name.clone(),
            value: NOT_AVAILABLE.to_string(),
            column_type: column.inferred_type.to_string(),
            nb_levels: column.nb_levels,
            is_row: true,
            description: or_na(column.description.as_deref()),
            controlled_term: column.controlled_term_str().to_string(),
            units: or_na(column.units.as_deref()),
            term_url: or_na(column.term_url.as_deref()),
        }
    }

    /// Level row for one value of a column.
    pub fn level(column: &ColumnDescriptor, level: &LevelRecord) -> Self {
        Self {
            dataset: column.dataset.clone(),
            nb_rows: column.nb_rows,
            column: column.name.clone(),
            value: level.value.clone(),
            column_type: NOT_AVAILABLE.to_string(),
            nb_levels: 0,
            is_row: false,
            description: or_na(level.description.as_deref()),
            controlled_term: or_na(level.controlled_term.as_deref()),
            units: NOT_AVAILABLE.to_string(),
            term_url: NOT_AVAILABLE.to_string(),
        }
    }
}

/// One row of `bulk_annotation_columns.tsv`: a header row without level data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnsRow {
    pub dataset: String,
    pub nb_rows: usize,
    pub column: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nb_levels: usize,
    pub description: String,
    pub controlled_term: String,
    pub units: String,
    pub term_url: String,
}

impl From<&LevelsRow> for ColumnsRow {
    fn from(row: &LevelsRow) -> Self {
        Self {
            dataset: row.dataset.clone(),
            nb_rows: row.nb_rows,
            column: row.column.clone(),
            column_type: row.column_type.clone(),
            nb_levels: row.nb_levels,
            description: row.description.clone(),
            controlled_term: row.controlled_term.clone(),
            units: row.units.clone(),
            term_url: row.term_url.clone(),
        }
    }
}

/// Accumulated output of a corpus run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelsTable {
    pub rows: Vec<LevelsRow>,
}

impl LevelsTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every row of `other`, keeping its order.
    pub fn extend(&mut self, other: LevelsTable) {
        self.rows.extend(other.rows);
    }

    /// Append a header row for `column`.
    pub fn push_header(&mut self, column: &ColumnDescriptor) {
        self.rows.push(LevelsRow::header(column));
    }

    /// Append a level row for `column`.
    pub fn push_level(&mut self, column: &ColumnDescriptor, level: &LevelRecord) {
        self.rows.push(LevelsRow::level(column, level));
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were emitted.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header rows only.
    pub fn header_rows(&self) -> impl Iterator<Item = &LevelsRow> {
        self.rows.iter().filter(|r| r.is_row)
    }

    /// Level rows only.
    pub fn level_rows(&self) -> impl Iterator<Item = &LevelsRow> {
        self.rows.iter().filter(|r| !r.is_row)
    }

    /// The header rows projected onto the columns-only layout.
    pub fn columns_rows(&self) -> Vec<ColumnsRow> {
        self.header_rows().map(ColumnsRow::from).collect()
    }

    /// How many datasets use each column name, most frequent first.
    ///
    /// Ties are ordered by column name.
    pub fn column_name_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for row in self.header_rows() {
            *counts.entry(row.column.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Write the levels table as TSV.
    pub fn write_tsv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_rows(path.as_ref(), &self.rows)
    }

    /// Write the columns-only table as TSV.
    pub fn write_columns_tsv(&self, path: impl AsRef<Path>) -> Result<()> {
        write_rows(path.as_ref(), &self.columns_rows())
    }

    /// Write the column name counts as TSV.
    pub fn write_column_counts_tsv(&self, path: impl AsRef<Path>) -> Result<()> {
        #[derive(Serialize)]
        struct CountRow {
            column: String,
            count: usize,
        }

        let rows: Vec<CountRow> = self
            .column_name_counts()
            .into_iter()
            .map(|(column, count)| CountRow { column, count })
            .collect();
        write_rows(path.as_ref(), &rows)
    }

    /// Read a levels table previously written by [`LevelsTable::write_tsv`].
    pub fn read_tsv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(file);

        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<LevelsRow>, _>>()?;
        Ok(Self { rows })
    }
}

fn or_na(value: Option<&str>) -> String {
    value.unwrap_or(NOT_AVAILABLE).to_string()
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                BagelError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        BagelError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
    })?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(BufWriter::new(file));

    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| BagelError::io(path, e))?;
    Ok(())
}

fn serialize_flag<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_flag(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid boolean '{}'", s)))
}

/// Read a boolean flag the way annotation tables spell them.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

//! Accepted annotation tables.

use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{BagelError, Result};
use crate::schema::parse_flag;

/// Reviewer verdict on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Keep,
    Drop,
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "keep" => Ok(Decision::Keep),
            "drop" => Ok(Decision::Drop),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

/// One row of an annotated levels table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotationRow {
    pub dataset: String,
    pub column: String,
    pub value: String,
    pub is_row: bool,
    /// Recorded type tag, if the table has a `type` column.
    pub column_type: Option<String>,
    pub description: String,
    pub controlled_term: String,
    pub is_part_of: String,
    pub decision: Decision,
}

impl AnnotationRow {
    /// A header row.
    pub fn header(dataset: &str, column: &str, controlled_term: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            column: column.to_string(),
            is_row: true,
            controlled_term: controlled_term.to_string(),
            ..Self::default()
        }
    }

    /// A level row.
    pub fn level(dataset: &str, column: &str, value: &str, controlled_term: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            column: column.to_string(),
            value: value.to_string(),
            is_row: false,
            controlled_term: controlled_term.to_string(),
            ..Self::default()
        }
    }

    /// Set the recorded type.
    pub fn with_type(mut self, column_type: &str) -> Self {
        self.column_type = Some(column_type.to_string());
        self
    }

    /// Set the tool this column is part of.
    pub fn with_part_of(mut self, is_part_of: &str) -> Self {
        self.is_part_of = is_part_of.to_string();
        self
    }

    /// Set the decision.
    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = decision;
        self
    }
}

/// The rows of one (dataset, column) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub column: String,
    pub rows: Vec<AnnotationRow>,
}

impl ColumnGroup {
    /// The first header row.
    pub fn header(&self) -> Option<&AnnotationRow> {
        self.rows.iter().find(|r| r.is_row)
    }

    /// Level rows in table order.
    pub fn levels(&self) -> impl Iterator<Item = &AnnotationRow> {
        self.rows.iter().filter(|r| !r.is_row)
    }

    /// Returns true if any row describes a single value.
    pub fn has_levels(&self) -> bool {
        self.rows.iter().any(|r| !r.is_row)
    }
}

/// An annotated levels table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    pub rows: Vec<AnnotationRow>,
}

const REQUIRED_COLUMNS: &[&str] = &["dataset", "column", "is_row", "controlled_term"];

impl AnnotationTable {
    /// Create a table from its rows.
    pub fn new(rows: Vec<AnnotationRow>) -> Self {
        Self { rows }
    }

    /// Load an annotated table from TSV.
    ///
    /// Cells are read verbatim: `n/a` and `nan` stay strings and empty cells
    /// are empty strings. `type`, `value`, `description`, `isPartOf` and
    /// `Decision` are optional.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Read an annotated table from any reader. `table` names the source in
    /// errors.
    pub fn from_reader(reader: impl std::io::Read, table: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let index = |name: &str| headers.iter().position(|h| h.trim() == name);

        for required in REQUIRED_COLUMNS {
            if index(*required).is_none() {
                return Err(BagelError::MissingColumn {
                    table: table.to_string(),
                    column: required.to_string(),
                });
            }
        }

        let dataset = index("dataset");
        let column = index("column");
        let value = index("value");
        let is_row_idx = index("is_row");
        let column_type = index("type");
        let description = index("description");
        let controlled_term = index("controlled_term");
        let is_part_of = index("isPartOf");
        let decision_idx = index("Decision");

        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .to_string()
            };
            let line = row_idx + 2;

            let flag = cell(is_row_idx);
            let is_row = parse_flag(&flag).ok_or_else(|| BagelError::Parse {
                row: line,
                column: is_row_idx.unwrap_or_default(),
                message: format!("invalid is_row value '{}'", flag),
            })?;

            let decision = cell(decision_idx)
                .parse::<Decision>()
                .map_err(|message| BagelError::Parse {
                    row: line,
                    column: decision_idx.unwrap_or_default(),
                    message,
                })?;

            rows.push(AnnotationRow {
                dataset: cell(dataset),
                column: cell(column),
                value: cell(value),
                is_row,
                column_type: column_type.map(|i| cell(Some(i))),
                description: cell(description),
                controlled_term: cell(controlled_term),
                is_part_of: cell(is_part_of),
                decision,
            });
        }

        Ok(Self { rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows grouped by dataset and then by column, in first-seen order.
    pub fn by_dataset(&self) -> IndexMap<String, Vec<ColumnGroup>> {
        let mut datasets: IndexMap<String, IndexMap<String, Vec<AnnotationRow>>> = IndexMap::new();
        for row in &self.rows {
            datasets
                .entry(row.dataset.clone())
                .or_default()
                .entry(row.column.clone())
                .or_default()
                .push(row.clone());
        }

        datasets
            .into_iter()
            .map(|(dataset, columns)| {
                let groups = columns
                    .into_iter()
                    .map(|(column, rows)| ColumnGroup { column, rows })
                    .collect();
                (dataset, groups)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "dataset\tcolumn\ttype\tvalue\tis_row\tdescription\tcontrolled_term\tisPartOf\tDecision\n\
        ds000002\tsex\tobject\tn/a\tTrue\t\tnb:Sex\t\tkeep\n\
        ds000002\tsex\tn/a\tnan\tFalse\t\tnb:MissingValue\t\tkeep\n\
        ds000002\tsex\tn/a\tm\tFalse\t\tsnomed:248153007\t\tkeep\n";

    #[test]
    fn test_missing_sentinels_stay_strings() {
        let table = AnnotationTable::from_reader(MISSING.as_bytes(), "missing.tsv").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[0].is_part_of, "");
        assert_eq!(table.rows[0].value, "n/a");
        assert_eq!(table.rows[0].column_type.as_deref(), Some("object"));
        assert_eq!(table.rows[1].value, "nan");
        assert!(!table.rows[1].is_row);
    }

    #[test]
    fn test_optional_columns() {
        let data = "dataset\tcolumn\tis_row\tcontrolled_term\nds1\tage\ttrue\tnb:Age\n";
        let table = AnnotationTable::from_reader(data.as_bytes(), "t").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.column_type, None);
        assert_eq!(row.decision, Decision::Keep);
        assert_eq!(row.value, "");
    }

    #[test]
    fn test_missing_required_column() {
        let data = "dataset\tcolumn\tis_row\nds1\tage\tTrue\n";
        let err = AnnotationTable::from_reader(data.as_bytes(), "t").unwrap_err();
        assert!(matches!(err, BagelError::MissingColumn { ref column, .. } if column == "controlled_term"));
    }

    #[test]
    fn test_bad_decision() {
        let data = "dataset\tcolumn\tis_row\tcontrolled_term\tDecision\nds1\tage\tTrue\tnb:Age\tmaybe\n";
        let err = AnnotationTable::from_reader(data.as_bytes(), "t").unwrap_err();
        assert!(matches!(err, BagelError::Parse { row: 2, .. }));
    }

    #[test]
    fn test_grouping() {
        let table = AnnotationTable::new(vec![
            AnnotationRow::header("ds1", "sex", "nb:Sex"),
            AnnotationRow::header("ds2", "age", "nb:Age"),
            AnnotationRow::level("ds1", "sex", "F", "snomed:248152002"),
        ]);

        let groups = table.by_dataset();
        assert_eq!(groups.len(), 2);
        let sex = &groups["ds1"][0];
        assert_eq!(sex.rows.len(), 2);
        assert!(sex.has_levels());
        assert!(!groups["ds2"][0].has_levels());
    }
}

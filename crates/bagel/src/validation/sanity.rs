//! Invariant checks over an assembled levels table.

use indexmap::IndexMap;
use serde_json::json;
use tracing::error;

use crate::schema::{LevelsRow, LevelsTable, NOT_AVAILABLE};

use super::observation::{Evidence, Observation, ObservationType, Severity};

/// Trait for checks run over the levels table.
pub trait Validator {
    /// Run validation and return observations.
    fn validate(&self, table: &LevelsTable) -> Vec<Observation>;
}

/// Rows grouped by dataset, in first-seen order.
///
/// Grouping does not assume datasets are contiguous, so tables assembled in
/// any inter-dataset order are checked the same way.
fn by_dataset(table: &LevelsTable) -> IndexMap<&str, Vec<&LevelsRow>> {
    let mut groups: IndexMap<&str, Vec<&LevelsRow>> = IndexMap::new();
    for row in &table.rows {
        groups.entry(row.dataset.as_str()).or_default().push(row);
    }
    groups
}

/// Values that occur more than once, with their counts.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> IndexMap<&'a str, usize> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}

/// No two columns of a dataset may carry the same controlled term.
pub struct ControlledTermValidator;

impl Validator for ControlledTermValidator {
    fn validate(&self, table: &LevelsTable) -> Vec<Observation> {
        let mut observations = Vec::new();

        for (dataset, rows) in by_dataset(table) {
            let terms = rows
                .iter()
                .filter(|r| r.is_row && r.controlled_term != NOT_AVAILABLE)
                .map(|r| r.controlled_term.as_str());

            for (term, count) in duplicates(terms) {
                let columns: Vec<&str> = rows
                    .iter()
                    .filter(|r| r.is_row && r.controlled_term == term)
                    .map(|r| r.column.as_str())
                    .collect();

                observations.push(
                    Observation::new(
                        ObservationType::DuplicateControlledTerm,
                        Severity::Error,
                        dataset,
                        format!("controlled_term '{}' duplicated for dataset {}", term, dataset),
                    )
                    .with_evidence(
                        Evidence::new()
                            .with_value(term)
                            .with_occurrences(count)
                            .with_expected(json!(columns)),
                    )
                    .with_detector("controlled_term_validator"),
                );
            }
        }

        observations
    }
}

/// A dataset describes each column once.
pub struct ColumnValidator;

impl Validator for ColumnValidator {
    fn validate(&self, table: &LevelsTable) -> Vec<Observation> {
        let mut observations = Vec::new();

        for (dataset, rows) in by_dataset(table) {
            let columns = rows.iter().filter(|r| r.is_row).map(|r| r.column.as_str());

            for (column, count) in duplicates(columns) {
                observations.push(
                    Observation::new(
                        ObservationType::DuplicateColumn,
                        Severity::Error,
                        dataset,
                        format!("column '{}' duplicated for dataset {}", column, dataset),
                    )
                    .with_column(column)
                    .with_evidence(Evidence::new().with_value(column).with_occurrences(count))
                    .with_detector("column_validator"),
                );
            }
        }

        observations
    }
}

/// A column lists each level once.
pub struct LevelValidator;

impl Validator for LevelValidator {
    fn validate(&self, table: &LevelsTable) -> Vec<Observation> {
        let mut observations = Vec::new();

        for (dataset, rows) in by_dataset(table) {
            let mut levels: IndexMap<&str, Vec<&str>> = IndexMap::new();
            for row in rows.iter().filter(|r| !r.is_row) {
                levels
                    .entry(row.column.as_str())
                    .or_default()
                    .push(row.value.as_str());
            }

            for (column, values) in levels {
                for (value, count) in duplicates(values.into_iter()) {
                    observations.push(
                        Observation::new(
                            ObservationType::DuplicateLevel,
                            Severity::Error,
                            dataset,
                            format!(
                                "level '{}' duplicated for dataset {} and column {}",
                                value, dataset, column
                            ),
                        )
                        .with_column(column)
                        .with_evidence(Evidence::new().with_value(value).with_occurrences(count))
                        .with_detector("level_validator"),
                    );
                }
            }
        }

        observations
    }
}

/// Runs every invariant check and logs what it finds.
///
/// Findings are reported, never enforced: the table is left as is.
pub struct SanityChecker {
    validators: Vec<Box<dyn Validator>>,
}

impl SanityChecker {
    /// Create a checker with all invariant checks.
    pub fn new() -> Self {
        Self {
            validators: vec![
                Box::new(ControlledTermValidator),
                Box::new(ColumnValidator),
                Box::new(LevelValidator),
            ],
        }
    }

    /// Run all checks and collect observations.
    pub fn check(&self, table: &LevelsTable) -> Vec<Observation> {
        let observations: Vec<Observation> = self
            .validators
            .iter()
            .flat_map(|v| v.validate(table))
            .collect();

        for obs in &observations {
            error!(
                dataset = %obs.dataset,
                column = obs.column.as_deref().unwrap_or(NOT_AVAILABLE),
                kind = obs.observation_type.label(),
                "{}",
                obs.description
            );
        }

        observations
    }
}

impl Default for SanityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescriptor, ConceptTag, LevelRecord, TypeTag};

    fn column(dataset: &str, name: &str, term: Option<ConceptTag>) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new(dataset, name, TypeTag::Object, 2, 2);
        column.controlled_term = term;
        column
    }

    #[test]
    fn test_clean_table() {
        let mut table = LevelsTable::new();
        let sex = column("ds1", "sex", Some(ConceptTag::Sex));
        table.push_header(&column("ds1", "participant_id", Some(ConceptTag::ParticipantId)));
        table.push_header(&sex);
        table.push_level(&sex, &LevelRecord::undeclared("F"));
        table.push_level(&sex, &LevelRecord::undeclared("M"));
        table.push_header(&column("ds1", "group", None));
        table.push_header(&column("ds1", "site", None));

        assert!(SanityChecker::new().check(&table).is_empty());
    }

    #[test]
    fn test_duplicate_controlled_term() {
        let mut table = LevelsTable::new();
        table.push_header(&column("ds1", "age", Some(ConceptTag::Age)));
        table.push_header(&column("ds1", "age_ses02", Some(ConceptTag::Age)));
        table.push_header(&column("ds2", "age", Some(ConceptTag::Age)));

        let observations = ControlledTermValidator.validate(&table);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].dataset, "ds1");
        assert_eq!(observations[0].evidence.occurrences, Some(2));
    }

    #[test]
    fn test_duplicate_column_across_interleaved_datasets() {
        let mut table = LevelsTable::new();
        table.push_header(&column("ds1", "sex", None));
        table.push_header(&column("ds2", "sex", None));
        table.push_header(&column("ds1", "sex", None));

        let observations = ColumnValidator.validate(&table);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].observation_type, ObservationType::DuplicateColumn);
    }

    #[test]
    fn test_duplicate_level() {
        let mut table = LevelsTable::new();
        let sex = column("ds1", "sex", None);
        let group = column("ds1", "group", None);
        table.push_header(&sex);
        table.push_level(&sex, &LevelRecord::undeclared("M"));
        table.push_level(&sex, &LevelRecord::undeclared("M"));
        table.push_header(&group);
        table.push_level(&group, &LevelRecord::undeclared("M"));

        let observations = LevelValidator.validate(&table);
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].column.as_deref(), Some("sex"));
    }
}

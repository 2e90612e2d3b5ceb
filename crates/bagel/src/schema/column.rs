//! Per-column descriptors and level records.

use serde::{Deserialize, Serialize};

use super::types::{ConceptTag, TypeTag};

/// Placeholder written for any attribute that has no value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Everything inferred about one column of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Dataset the column belongs to.
    pub dataset: String,
    /// Column name as found in the table header (whitespace-stripped).
    pub name: String,
    /// Inferred type.
    pub inferred_type: TypeTag,
    /// Number of rows in the dataset's table.
    pub nb_rows: usize,
    /// Number of distinct raw values, missing counted once.
    pub nb_levels: usize,
    /// Description from the data dictionary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Units from the data dictionary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    /// Term URL from the data dictionary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_url: Option<String>,
    /// Concept matched by the vocabulary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled_term: Option<ConceptTag>,
}

impl ColumnDescriptor {
    /// Create a descriptor with only the required attributes set.
    pub fn new(
        dataset: impl Into<String>,
        name: impl Into<String>,
        inferred_type: TypeTag,
        nb_rows: usize,
        nb_levels: usize,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            name: name.into(),
            inferred_type,
            nb_rows,
            nb_levels,
            description: None,
            units: None,
            term_url: None,
            controlled_term: None,
        }
    }

    /// Controlled term as written in output tables.
    pub fn controlled_term_str(&self) -> &str {
        self.controlled_term
            .as_ref()
            .map(|c| c.term())
            .unwrap_or(NOT_AVAILABLE)
    }
}

/// One categorical value of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// The normalized raw value.
    pub value: String,
    /// Label taken from a declared level mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Controlled term attached to this specific value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controlled_term: Option<String>,
}

impl LevelRecord {
    /// A level observed in the data but absent from the dictionary.
    pub fn undeclared(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            controlled_term: None,
        }
    }

    /// A level declared in the dictionary with its label.
    pub fn declared(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: Some(label.into()),
            controlled_term: None,
        }
    }

    /// Attach a controlled term.
    pub fn with_controlled_term(mut self, term: impl Into<String>) -> Self {
        self.controlled_term = Some(term.into());
        self
    }
}

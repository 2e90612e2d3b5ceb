//! Per-dataset row building.

use tracing::debug;

use crate::inference::{TypeInference, VocabularyMatcher};
use crate::input::{DataDictionary, ParticipantsTable, TableColumn};
use crate::levels::LevelReconciler;
use crate::schema::{ColumnDescriptor, LevelsTable};

/// Turns one dataset's participants table into levels-table rows.
///
/// Every column yields a header row. Columns that pass the skip policy are
/// followed by one row per level, declared levels first.
#[derive(Default)]
pub struct DatasetRowBuilder {
    inference: TypeInference,
    vocabulary: VocabularyMatcher,
    reconciler: LevelReconciler,
}

impl DatasetRowBuilder {
    /// Create a builder with the default heuristics and threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom level-reconciliation policy.
    pub fn with_reconciler(reconciler: LevelReconciler) -> Self {
        Self {
            reconciler,
            ..Self::default()
        }
    }

    /// Describe a single column.
    pub fn describe_column(
        &self,
        dataset: &str,
        column: &TableColumn,
        nb_rows: usize,
        dictionary: &DataDictionary,
    ) -> ColumnDescriptor {
        let inferred_type = self.inference.infer(column);
        let mut descriptor = ColumnDescriptor::new(
            dataset,
            column.name.trim(),
            inferred_type,
            nb_rows,
            column.distinct_count(),
        );

        descriptor.description = dictionary.description(&column.name);
        descriptor.units = dictionary.units(&column.name);
        descriptor.term_url = dictionary.term_url(&column.name);
        descriptor.controlled_term = self.vocabulary.match_concept(column, inferred_type);

        descriptor
    }

    /// Build all rows for one dataset.
    pub fn build(
        &self,
        dataset: &str,
        table: &ParticipantsTable,
        dictionary: &DataDictionary,
    ) -> LevelsTable {
        debug!(dataset = %dataset, columns = ?table.headers(), "building rows");

        let mut rows = LevelsTable::new();
        for column in &table.columns {
            let descriptor = self.describe_column(dataset, column, table.row_count(), dictionary);
            rows.push_header(&descriptor);

            let declared = dictionary.levels(&column.name);
            for level in self
                .reconciler
                .levels_for(&descriptor, column.unique_values(), &declared)
            {
                debug!(column = %descriptor.name, value = %level.value, "appending level");
                rows.push_level(&descriptor, &level);
            }
        }
        rows
    }
}

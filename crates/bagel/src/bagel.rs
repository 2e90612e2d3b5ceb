//! Main Bagel struct and corpus-level API.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::builder::DatasetRowBuilder;
use crate::error::Result;
use crate::input::{CorpusIndex, DataDictionary, DatasetMetadata, Parser, ParserConfig};
use crate::levels::{LevelReconciler, MAX_NB_LEVELS};
use crate::schema::LevelsTable;
use crate::validation::{Observation, SanityChecker};

/// File name of the levels table.
pub const LEVELS_FILE: &str = "bulk_annotation_levels.tsv";
/// File name of the columns-only table.
pub const COLUMNS_FILE: &str = "bulk_annotation_columns.tsv";
/// File name of the column name counts.
pub const UNIQUE_COLUMNS_FILE: &str = "unique_columns.tsv";

/// Configuration for a corpus run.
#[derive(Debug, Clone)]
pub struct BagelConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Columns with more distinct values are not enumerated.
    pub max_levels: usize,
    /// Process at most this many datasets of the index (None = all).
    pub dry_run_limit: Option<usize>,
    /// Keep datasets that have no MRI data.
    pub include_datasets_without_mri: bool,
}

impl Default for BagelConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            max_levels: MAX_NB_LEVELS,
            dry_run_limit: None,
            include_datasets_without_mri: false,
        }
    }
}

/// A dataset that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDataset {
    pub name: String,
    pub reason: String,
}

/// Summary of a corpus run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusReport {
    /// Datasets looked at, within the dry-run limit.
    pub datasets_seen: usize,
    /// Datasets excluded by the index flags.
    pub excluded: Vec<String>,
    /// Datasets that failed to load.
    pub skipped: Vec<SkippedDataset>,
    /// Datasets that produced rows.
    pub processed: usize,
    /// Rows in the levels table.
    pub rows_emitted: usize,
    /// Invariant violations found after the run.
    pub observations: Vec<Observation>,
}

/// Output of a corpus run.
#[derive(Debug, Clone)]
pub struct CorpusRun {
    pub table: LevelsTable,
    pub report: CorpusReport,
}

impl CorpusRun {
    /// Write the levels table, the columns-only table and the column name
    /// counts into `output_dir`.
    pub fn write(&self, output_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();
        let levels = output_dir.join(LEVELS_FILE);
        let columns = output_dir.join(COLUMNS_FILE);
        let unique = output_dir.join(UNIQUE_COLUMNS_FILE);

        self.table.write_tsv(&levels)?;
        self.table.write_columns_tsv(&columns)?;
        self.table.write_column_counts_tsv(&unique)?;

        Ok(vec![levels, columns, unique])
    }
}

/// The corpus driver.
///
/// # Example
///
/// ```no_run
/// use bagel::Bagel;
///
/// let bagel = Bagel::new();
/// let run = bagel.run_index("openneuro.tsv", "/data/openneuro").unwrap();
/// run.write("outputs").unwrap();
/// println!("Rows: {}", run.report.rows_emitted);
/// ```
pub struct Bagel {
    config: BagelConfig,
    parser: Parser,
    builder: DatasetRowBuilder,
    checker: SanityChecker,
}

impl Bagel {
    /// Create a driver with default configuration.
    pub fn new() -> Self {
        Self::with_config(BagelConfig::default())
    }

    /// Create a driver with custom configuration.
    pub fn with_config(config: BagelConfig) -> Self {
        Self {
            parser: Parser::with_config(config.parser.clone()),
            builder: DatasetRowBuilder::with_reconciler(LevelReconciler::with_max_levels(
                config.max_levels,
            )),
            checker: SanityChecker::new(),
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BagelConfig {
        &self.config
    }

    /// Load the index at `index_path` and run over the corpus.
    pub fn run_index(
        &self,
        index_path: impl AsRef<Path>,
        corpus_root: impl AsRef<Path>,
    ) -> Result<CorpusRun> {
        let index = CorpusIndex::load(index_path)?;
        Ok(self.run(&index, corpus_root.as_ref()))
    }

    /// Process every dataset of the index.
    ///
    /// Datasets that fail are logged and listed in the report; the run
    /// always completes.
    pub fn run(&self, index: &CorpusIndex, corpus_root: &Path) -> CorpusRun {
        let mut table = LevelsTable::new();
        let mut report = CorpusReport::default();

        let limit = self.config.dry_run_limit.unwrap_or(usize::MAX);
        for dataset in index.iter().take(limit) {
            report.datasets_seen += 1;
            info!(dataset = %dataset.name, "processing dataset");

            if dataset.is_excluded(self.config.include_datasets_without_mri) {
                debug!(dataset = %dataset.name, "excluded by index flags");
                report.excluded.push(dataset.name.clone());
                continue;
            }

            match self.process_dataset(dataset, corpus_root) {
                Ok(rows) => {
                    report.processed += 1;
                    table.extend(rows);
                }
                Err(e) => {
                    warn!(dataset = %dataset.name, error = %e, "could not process dataset");
                    report.skipped.push(SkippedDataset {
                        name: dataset.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.rows_emitted = table.len();
        report.observations = self.checker.check(&table);

        CorpusRun { table, report }
    }

    /// Build the rows of a single dataset.
    pub fn process_dataset(&self, dataset: &DatasetMetadata, corpus_root: &Path) -> Result<LevelsTable> {
        let (participants, source) = self.parser.parse_file(dataset.participants_tsv(corpus_root))?;
        debug!(
            dataset = %dataset.name,
            hash = %source.hash,
            rows = source.row_count,
            columns = source.column_count,
            "loaded participants table"
        );

        let dictionary = if dataset.has_participant_json {
            DataDictionary::load_optional(dataset.participants_json(corpus_root))?
        } else {
            DataDictionary::new()
        };

        Ok(self.builder.build(&dataset.name, &participants, &dictionary))
    }
}

impl Default for Bagel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn corpus() -> (tempfile::TempDir, CorpusIndex) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("ds1")).unwrap();
        fs::write(
            root.join("ds1/participants.tsv"),
            "participant_id\tsex\nsub-01\tF\nsub-02\tM\n",
        )
        .unwrap();

        fs::create_dir_all(root.join("ds2")).unwrap();
        fs::write(root.join("ds2/participants.tsv"), "a\tb\n1\t2\t3\n").unwrap();

        let index = CorpusIndex::from_reader(
            "name\thas_mri\thas_participant_tsv\thas_participant_json\n\
             ds1\tTrue\tTrue\tFalse\n\
             ds2\tTrue\tTrue\tFalse\n\
             ds3\tFalse\tTrue\tFalse\n"
                .as_bytes(),
            "index",
        )
        .unwrap();

        (dir, index)
    }

    #[test]
    fn test_run_skips_bad_datasets() {
        let (dir, index) = corpus();
        let run = Bagel::new().run(&index, dir.path());

        assert_eq!(run.report.datasets_seen, 3);
        assert_eq!(run.report.processed, 1);
        assert_eq!(run.report.excluded, vec!["ds3".to_string()]);
        assert_eq!(run.report.skipped.len(), 1);
        assert_eq!(run.report.skipped[0].name, "ds2");
        assert_eq!(run.table.header_rows().count(), 2);
        assert!(run.report.observations.is_empty());
    }

    #[test]
    fn test_dry_run_limit() {
        let (dir, index) = corpus();
        let config = BagelConfig {
            dry_run_limit: Some(1),
            ..BagelConfig::default()
        };
        let run = Bagel::with_config(config).run(&index, dir.path());
        assert_eq!(run.report.datasets_seen, 1);
    }

    #[test]
    fn test_write_outputs() {
        let (dir, index) = corpus();
        let run = Bagel::new().run(&index, dir.path());
        let out = dir.path().join("outputs");

        let written = run.write(&out).unwrap();
        assert_eq!(written.len(), 3);
        assert!(out.join(LEVELS_FILE).exists());
        let unique = fs::read_to_string(out.join(UNIQUE_COLUMNS_FILE)).unwrap();
        assert!(unique.starts_with("column\tcount\n"));
    }
}

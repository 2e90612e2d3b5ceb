//! Bagel: bulk annotation of BIDS participants tables.
//!
//! Bagel scans a corpus of BIDS datasets, reads each `participants.tsv` and
//! its optional `participants.json` data dictionary, and infers what every
//! column holds: a type from its raw values, a controlled term from its name
//! and content, and the categorical levels worth annotating. The result is a
//! levels table for human review. Reviewed annotations are then compiled back
//! into enriched data dictionaries.
//!
//! # Core Principles
//!
//! - **Per-dataset isolation**: a broken dataset is logged and skipped, the
//!   run always completes
//! - **Additive enrichment**: compiled dictionaries keep every field they do
//!   not set
//! - **Advisory checks**: invariant and schema violations are reported, never
//!   enforced
//!
//! # Example
//!
//! ```no_run
//! use bagel::Bagel;
//!
//! let bagel = Bagel::new();
//! let run = bagel.run_index("openneuro.tsv", "/data/openneuro").unwrap();
//!
//! println!("Datasets: {}", run.report.processed);
//! println!("Rows: {}", run.table.len());
//! ```

pub mod annotation;
pub mod assessments;
pub mod builder;
pub mod error;
pub mod inference;
pub mod input;
pub mod levels;
pub mod schema;
pub mod validation;

mod bagel;

pub use crate::bagel::{
    Bagel, BagelConfig, CorpusReport, CorpusRun, SkippedDataset, COLUMNS_FILE, LEVELS_FILE,
    UNIQUE_COLUMNS_FILE,
};
pub use annotation::{AnnotationTable, DictionaryCompiler};
pub use builder::DatasetRowBuilder;
pub use error::{BagelError, Result};
pub use input::{CorpusIndex, DataDictionary, DatasetMetadata, SourceMetadata};
pub use schema::{ColumnDescriptor, ConceptTag, LevelRecord, LevelsTable, TypeTag};
pub use validation::{Observation, ObservationType, Severity};

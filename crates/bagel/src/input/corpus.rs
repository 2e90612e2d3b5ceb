//! The corpus index and per-dataset locations.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{BagelError, Result};
use crate::schema::parse_flag;

/// One dataset of the corpus, as listed in the index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetMetadata {
    pub name: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub has_mri: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub has_participant_tsv: bool,
    #[serde(deserialize_with = "deserialize_flag")]
    pub has_participant_json: bool,
}

impl DatasetMetadata {
    /// Directory of this dataset under the corpus root.
    pub fn root(&self, corpus_root: &Path) -> PathBuf {
        corpus_root.join(&self.name)
    }

    /// Path of the participants table.
    pub fn participants_tsv(&self, corpus_root: &Path) -> PathBuf {
        self.root(corpus_root).join("participants.tsv")
    }

    /// Path of the participants data dictionary.
    pub fn participants_json(&self, corpus_root: &Path) -> PathBuf {
        self.root(corpus_root).join("participants.json")
    }

    /// Returns true if the dataset lacks what the pipeline needs.
    ///
    /// Datasets without MRI are excluded unless `include_without_mri` is set;
    /// datasets without a participants table are always excluded.
    pub fn is_excluded(&self, include_without_mri: bool) -> bool {
        !self.has_participant_tsv || (!self.has_mri && !include_without_mri)
    }
}

/// The table listing every dataset of a corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusIndex {
    pub datasets: Vec<DatasetMetadata>,
}

impl CorpusIndex {
    /// Create an index from its rows.
    pub fn new(datasets: Vec<DatasetMetadata>) -> Self {
        Self { datasets }
    }

    /// Load an index TSV with columns `name`, `has_mri`,
    /// `has_participant_tsv` and `has_participant_json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Read an index from any reader. `table` names the source in errors.
    pub fn from_reader(reader: impl std::io::Read, table: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for required in ["name", "has_mri", "has_participant_tsv", "has_participant_json"] {
            if !headers.iter().any(|h| h == required) {
                return Err(BagelError::MissingColumn {
                    table: table.to_string(),
                    column: required.to_string(),
                });
            }
        }

        let datasets = reader
            .deserialize()
            .collect::<std::result::Result<Vec<DatasetMetadata>, _>>()?;
        Ok(Self { datasets })
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    /// Returns true if the index lists no dataset.
    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Iterate over datasets in index order.
    pub fn iter(&self) -> impl Iterator<Item = &DatasetMetadata> {
        self.datasets.iter()
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_flag(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid boolean '{}'", s)))
}

/// Name of a dataset from its `dataset_description.json`.
///
/// A missing or unreadable file, a missing `Name` or an empty name all give
/// `None`.
pub fn dataset_name(dataset_root: impl AsRef<Path>) -> Option<String> {
    let path = dataset_root.as_ref().join("dataset_description.json");
    let file = File::open(path).ok()?;
    let description: Value = serde_json::from_reader(file).ok()?;

    description
        .get("Name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
}

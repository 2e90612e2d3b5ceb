//! Folding annotation decisions into per-dataset data dictionaries.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::Result;
use crate::input::DataDictionary;
use crate::validation::{DictionarySchemaValidator, Observation};

use super::decision::{AnnotationTable, ColumnGroup};
use super::merge::merge;
use super::shape::describe;

/// Stand-in description for columns the source dictionary left undescribed.
pub const FILLER_DESCRIPTION: &str = "There should have been a description here, but there wasn't. :(";

/// Description written by the standalone add-description stage.
pub const ADDED_DESCRIPTION: &str = "added description for Neurobagel";

/// Give every entry lacking a `Description` the `filler` text.
///
/// Returns true if any entry was changed.
pub fn add_description(entries: &mut Map<String, Value>, filler: &str) -> bool {
    let mut changed = false;
    for entry in entries.values_mut() {
        if let Value::Object(fields) = entry {
            if !fields.contains_key("Description") {
                fields.insert("Description".to_string(), Value::String(filler.to_string()));
                changed = true;
            }
        }
    }
    changed
}

/// Add the standard description to a dictionary file in place.
///
/// Returns true if the file content changed.
pub fn add_description_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let mut entries = DataDictionary::load(path)?.into_map();
    let changed = add_description(&mut entries, ADDED_DESCRIPTION);
    DataDictionary::from_map(entries).save(path)?;
    Ok(changed)
}

/// Outcome of compiling one dataset.
#[derive(Debug, Clone)]
pub struct CompiledDictionary {
    pub dataset: String,
    pub dictionary: DataDictionary,
    /// Schema violations; advisory only.
    pub observations: Vec<Observation>,
}

impl CompiledDictionary {
    /// Returns true if the dictionary passed schema validation.
    pub fn is_valid(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Outcome of compiling an annotation table.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    /// Files written, one per dataset.
    pub written: Vec<PathBuf>,
    /// Datasets whose dictionary failed schema validation.
    pub invalid: Vec<String>,
    /// Datasets that could not be compiled, with the reason.
    pub skipped: Vec<(String, String)>,
}

/// Compiles annotation decisions into data dictionaries.
#[derive(Debug, Clone, Default)]
pub struct DictionaryCompiler {
    validator: DictionarySchemaValidator,
}

impl DictionaryCompiler {
    /// Create a new compiler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one dataset's column groups into its existing dictionary.
    pub fn compile(
        &self,
        dataset: &str,
        groups: &[ColumnGroup],
        existing: DataDictionary,
    ) -> CompiledDictionary {
        let mut entries = existing.into_map();

        for group in groups {
            if group.header().is_none() {
                warn!(dataset = %dataset, column = %group.column, "no header row, column ignored");
                continue;
            }
            let Some(computed) = describe(group) else {
                continue;
            };

            let previous = entries
                .get(&group.column)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()));
            entries.insert(group.column.clone(), merge(&previous, &computed));
        }

        add_description(&mut entries, FILLER_DESCRIPTION);

        let dictionary = DataDictionary::from_map(entries);
        let observations = self.validator.validate(dataset, &dictionary.clone().into_value());
        if !observations.is_empty() {
            warn!(
                dataset = %dataset,
                violations = observations.len(),
                "data dictionary does not validate"
            );
        }

        CompiledDictionary {
            dataset: dataset.to_string(),
            dictionary,
            observations,
        }
    }

    /// Compile every dataset of an annotation table.
    ///
    /// Existing dictionaries are read from
    /// `<dictionaries_root>/<dataset>/participants.json` when present and the
    /// results are written to `<output_dir>/<dataset>.json`. A dataset whose
    /// existing dictionary cannot be read is skipped.
    pub fn compile_table(
        &self,
        table: &AnnotationTable,
        dictionaries_root: &Path,
        output_dir: &Path,
    ) -> Result<CompileReport> {
        let mut report = CompileReport::default();

        for (dataset, groups) in table.by_dataset() {
            let source = dictionaries_root.join(&dataset).join("participants.json");
            let existing = match DataDictionary::load_optional(&source) {
                Ok(existing) => existing,
                Err(e) => {
                    warn!(dataset = %dataset, error = %e, "could not read data dictionary");
                    report.skipped.push((dataset, e.to_string()));
                    continue;
                }
            };

            let compiled = self.compile(&dataset, &groups, existing);
            if !compiled.is_valid() {
                report.invalid.push(dataset.clone());
            }

            let path = output_dir.join(format!("{}.json", dataset));
            compiled.dictionary.save(&path)?;
            info!(dataset = %dataset, path = %path.display(), "wrote data dictionary");
            report.written.push(path);
        }

        Ok(report)
    }
}

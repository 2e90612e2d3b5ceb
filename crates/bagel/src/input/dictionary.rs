//! `participants.json` data dictionaries.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{BagelError, Result};
use crate::schema::NOT_AVAILABLE;

/// A data dictionary: column name to description object.
///
/// Entries are kept as raw JSON so that fields this crate does not interpret
/// survive a load/save cycle untouched, in their original order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDictionary {
    entries: Map<String, Value>,
}

impl DataDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(entries: Map<String, Value>) -> Self {
        Self { entries }
    }

    /// Build a dictionary from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            other => Err(BagelError::Config(format!(
                "data dictionary must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Load a dictionary from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        Self::from_value(value)
    }

    /// Load a dictionary, treating a missing file as an empty dictionary.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write the dictionary as two-space indented JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

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
            BagelError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.entries).map_err(|e| {
            BagelError::Persistence(format!("Failed to serialize data dictionary: {}", e))
        })?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| BagelError::io(path, e))?;

        Ok(())
    }

    /// Number of described columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no column is described.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw entries.
    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Consume the dictionary, returning its JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.entries
    }

    /// Consume the dictionary, returning it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.entries)
    }

    /// The description object for a column.
    ///
    /// Falls back to a whitespace-insensitive key match, since headers and
    /// dictionary keys are often typed by hand.
    pub fn entry(&self, column: &str) -> Option<&Map<String, Value>> {
        self.entries
            .get(column)
            .or_else(|| {
                let wanted = column.trim();
                self.entries
                    .iter()
                    .find(|(key, _)| key.trim() == wanted)
                    .map(|(_, v)| v)
            })
            .and_then(Value::as_object)
    }

    /// `Description` of a column.
    pub fn description(&self, column: &str) -> Option<String> {
        self.field(column, "Description")
    }

    /// `Units` of a column, falling back to the singular `Unit`.
    pub fn units(&self, column: &str) -> Option<String> {
        self.field(column, "Units")
            .or_else(|| self.field(column, "Unit"))
    }

    /// `TermURL` of a column.
    pub fn term_url(&self, column: &str) -> Option<String> {
        self.field(column, "TermURL")
    }

    /// Declared levels of a column with their labels, in declaration order.
    ///
    /// `Levels` is normally an object of value to label. Labels given as
    /// objects use their `Description` or `Label` field. A `Levels` array
    /// declares values without labels.
    pub fn levels(&self, column: &str) -> IndexMap<String, String> {
        let Some(levels) = self.entry(column).and_then(|e| e.get("Levels")) else {
            return IndexMap::new();
        };

        match levels {
            Value::Object(map) => map
                .iter()
                .map(|(value, label)| (value.clone(), level_label(label)))
                .collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(text)
                .map(|value| (value, NOT_AVAILABLE.to_string()))
                .collect(),
            _ => IndexMap::new(),
        }
    }

    fn field(&self, column: &str, key: &str) -> Option<String> {
        self.entry(column).and_then(|e| e.get(key)).and_then(text)
    }
}

fn level_label(label: &Value) -> String {
    match label {
        Value::Object(map) => map
            .get("Description")
            .or_else(|| map.get("Label"))
            .and_then(text)
            .unwrap_or_else(|| label.to_string()),
        other => text(other).unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

/// Plain text of a JSON scalar. Null and empty strings carry no text.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dictionary(value: Value) -> DataDictionary {
        DataDictionary::from_value(value).unwrap()
    }

    #[test]
    fn test_fields() {
        let dict = dictionary(json!({
            "age": {"Description": "age of the participant", "Unit": "years"},
            "sex": {"Description": "sex", "Units": "n/a", "TermURL": "nb:Sex"}
        }));

        assert_eq!(dict.description("age").as_deref(), Some("age of the participant"));
        assert_eq!(dict.units("age").as_deref(), Some("years"));
        assert_eq!(dict.units("sex").as_deref(), Some("n/a"));
        assert_eq!(dict.term_url("sex").as_deref(), Some("nb:Sex"));
        assert_eq!(dict.term_url("age"), None);
        assert_eq!(dict.description("missing"), None);
    }

    #[test]
    fn test_levels_keep_order_and_flatten_labels() {
        let dict = dictionary(json!({
            "group": {"Levels": {
                "PD": "Parkinson's disease",
                "HC": {"Description": "healthy control", "TermURL": "x"},
                "3": 3
            }}
        }));

        let levels = dict.levels("group");
        let keys: Vec<&str> = levels.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["PD", "HC", "3"]);
        assert_eq!(levels["HC"], "healthy control");
        assert_eq!(levels["3"], "3");
    }

    #[test]
    fn test_levels_as_array() {
        let dict = dictionary(json!({"hand": {"Levels": ["L", "R"]}}));
        let levels = dict.levels("hand");
        assert_eq!(levels.len(), 2);
        assert_eq!(levels["R"], NOT_AVAILABLE);
    }

    #[test]
    fn test_entry_matches_trimmed_key() {
        let dict = dictionary(json!({"age ": {"Description": "age"}}));
        assert_eq!(dict.description("age").as_deref(), Some("age"));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(DataDictionary::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let dict = DataDictionary::load_optional(dir.path().join("participants.json")).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("ds.json");
        let dict = dictionary(json!({"age": {"Derivative": true, "Description": "age"}}));

        dict.save(&path).unwrap();
        let loaded = DataDictionary::load(&path).unwrap();
        assert_eq!(loaded, dict);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("  \"age\": {"));
    }
}

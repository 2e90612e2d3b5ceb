//! Assessment catalogue conversion for the annotation tool.
//!
//! The catalogue is a JSON document listing assessment instances under
//! `nb:Assessment`. The annotation tool takes it as a one-participant table
//! with a column per assessment, the cell holding the assessment's term URL.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BagelError, Result};

/// Participant label used for the single row.
const PLACEHOLDER_PARTICIPANT: &str = "sub-01";

/// One assessment instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assessment {
    #[serde(rename = "TermURL")]
    pub term_url: String,
    #[serde(rename = "Label")]
    pub label: String,
}

/// The assessment catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AssessmentCatalogue {
    #[serde(rename = "nb:Assessment")]
    pub assessments: Vec<Assessment>,
}

impl AssessmentCatalogue {
    /// Load a catalogue from JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| BagelError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// The header and single data row of the annotation-tool table.
    pub fn to_rows(&self) -> (Vec<&str>, Vec<&str>) {
        let header = std::iter::once("participant")
            .chain(self.assessments.iter().map(|a| a.label.as_str()))
            .collect();
        let row = std::iter::once(PLACEHOLDER_PARTICIPANT)
            .chain(self.assessments.iter().map(|a| a.term_url.as_str()))
            .collect();
        (header, row)
    }

    /// Write the annotation-tool table as TSV.
    pub fn write_tsv(&self, path: impl AsRef<Path>) -> Result<()> {
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

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)?;
        let (header, row) = self.to_rows();
        writer.write_record(&header)?;
        writer.write_record(&row)?;
        writer.flush().map_err(|e| BagelError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_catalogue() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("assessments.json");
        let output = dir.path().join("outputs").join("assessments.tsv");
        fs::write(
            &input,
            r#"{"nb:Assessment": [
                {"TermURL": "cogatlas:trm_4a3fd79d0b5b7", "Label": "Edinburgh Handedness Inventory"},
                {"TermURL": "cogatlas:trm_56a9137d9dce1", "Label": "Flanker task"}
            ]}"#,
        )
        .unwrap();

        let catalogue = AssessmentCatalogue::load(&input).unwrap();
        catalogue.write_tsv(&output).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "participant\tEdinburgh Handedness Inventory\tFlanker task");
        assert_eq!(
            lines[1],
            "sub-01\tcogatlas:trm_4a3fd79d0b5b7\tcogatlas:trm_56a9137d9dce1"
        );
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("assessments.json");
        fs::write(&input, "{}").unwrap();
        assert!(AssessmentCatalogue::load(&input).is_err());
    }
}

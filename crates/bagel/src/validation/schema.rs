//! Structural validation of annotated data dictionaries.

use serde_json::{Map, Value};

use super::observation::{Evidence, Observation, ObservationType, Severity};

const DETECTOR: &str = "dictionary_schema";

/// Checks that a data dictionary has the shape downstream tools expect.
///
/// Each column entry must be an object with a string `Description`.
/// `Levels` maps values to labels. `Annotations`, when present, needs an
/// `IsAbout` term and may carry exactly one of categorical `Levels` or a
/// continuous `Transformation`.
#[derive(Debug, Clone, Default)]
pub struct DictionarySchemaValidator;

impl DictionarySchemaValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Validate a whole dictionary.
    pub fn validate(&self, dataset: &str, dictionary: &Value) -> Vec<Observation> {
        let mut report = Report::new(dataset);

        let Some(entries) = dictionary.as_object() else {
            report.violation(None, "", "data dictionary is not an object", "object");
            return report.observations;
        };

        for (column, entry) in entries {
            self.validate_entry(&mut report, column, entry);
        }

        report.observations
    }

    /// Returns true if the dictionary has no violation.
    pub fn is_valid(&self, dataset: &str, dictionary: &Value) -> bool {
        self.validate(dataset, dictionary).is_empty()
    }

    fn validate_entry(&self, report: &mut Report, column: &str, entry: &Value) {
        let path = format!("/{}", column);
        let Some(entry) = entry.as_object() else {
            report.violation(Some(column), &path, "column entry is not an object", "object");
            return;
        };

        match entry.get("Description") {
            Some(Value::String(_)) => {}
            Some(_) => report.violation(
                Some(column),
                &format!("{}/Description", path),
                "Description is not a string",
                "string",
            ),
            None => report.violation(
                Some(column),
                &format!("{}/Description", path),
                "Description is missing",
                "string",
            ),
        }

        for key in ["Units", "TermURL"] {
            if let Some(value) = entry.get(key) {
                if !value.is_string() {
                    report.violation(
                        Some(column),
                        &format!("{}/{}", path, key),
                        &format!("{} is not a string", key),
                        "string",
                    );
                }
            }
        }

        if let Some(levels) = entry.get("Levels") {
            let levels_path = format!("{}/Levels", path);
            match levels.as_object() {
                Some(levels) => {
                    for (value, label) in levels {
                        if !(label.is_string() || label.is_object()) {
                            report.violation(
                                Some(column),
                                &format!("{}/{}", levels_path, value),
                                "level label is neither a string nor an object",
                                "string",
                            );
                        }
                    }
                }
                None => report.violation(Some(column), &levels_path, "Levels is not an object", "object"),
            }
        }

        if let Some(annotations) = entry.get("Annotations") {
            self.validate_annotations(report, column, &format!("{}/Annotations", path), annotations);
        }
    }

    fn validate_annotations(&self, report: &mut Report, column: &str, path: &str, annotations: &Value) {
        let Some(annotations) = annotations.as_object() else {
            report.violation(Some(column), path, "Annotations is not an object", "object");
            return;
        };

        match annotations.get("IsAbout") {
            Some(term) => check_term(report, column, &format!("{}/IsAbout", path), term),
            None => report.violation(
                Some(column),
                &format!("{}/IsAbout", path),
                "IsAbout is missing",
                "object",
            ),
        }

        for key in ["Transformation", "IsPartOf"] {
            if let Some(term) = annotations.get(key) {
                check_term(report, column, &format!("{}/{}", path, key), term);
            }
        }

        if let Some(levels) = annotations.get("Levels") {
            let levels_path = format!("{}/Levels", path);
            match levels.as_object() {
                Some(levels) => {
                    for (value, term) in levels {
                        check_term(report, column, &format!("{}/{}", levels_path, value), term);
                    }
                }
                None => report.violation(Some(column), &levels_path, "Levels is not an object", "object"),
            }
        }

        if annotations.contains_key("Levels") && annotations.contains_key("Transformation") {
            report.violation(
                Some(column),
                path,
                "column is annotated both as categorical and as continuous",
                "Levels or Transformation",
            );
        }

        if let Some(identifies) = annotations.get("Identifies") {
            if !identifies.is_string() {
                report.violation(
                    Some(column),
                    &format!("{}/Identifies", path),
                    "Identifies is not a string",
                    "string",
                );
            }
        }

        if let Some(missing) = annotations.get("MissingValues") {
            let valid = missing
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !valid {
                report.violation(
                    Some(column),
                    &format!("{}/MissingValues", path),
                    "MissingValues is not an array of strings",
                    "array",
                );
            }
        }
    }
}

/// A `{TermURL, Label}` pair.
fn check_term(report: &mut Report, column: &str, path: &str, term: &Value) {
    let ok = term.as_object().is_some_and(|t: &Map<String, Value>| {
        t.get("TermURL").is_some_and(Value::is_string) && t.get("Label").is_some_and(Value::is_string)
    });
    if !ok {
        report.violation(
            Some(column),
            path,
            "expected an object with string TermURL and Label",
            "{\"TermURL\": string, \"Label\": string}",
        );
    }
}

struct Report<'a> {
    dataset: &'a str,
    observations: Vec<Observation>,
}

impl<'a> Report<'a> {
    fn new(dataset: &'a str) -> Self {
        Self {
            dataset,
            observations: Vec::new(),
        }
    }

    fn violation(&mut self, column: Option<&str>, path: &str, message: &str, expected: &str) {
        let mut obs = Observation::new(
            ObservationType::SchemaViolation,
            Severity::Warning,
            self.dataset,
            message,
        )
        .with_evidence(Evidence::new().with_path(path).with_expected(expected))
        .with_detector(DETECTOR);

        if let Some(column) = column {
            obs = obs.with_column(column);
        }
        self.observations.push(obs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(value: Value) -> Vec<Observation> {
        DictionarySchemaValidator::new().validate("ds", &value)
    }

    #[test]
    fn test_valid_dictionary() {
        let dict = json!({
            "participant_id": {
                "Description": "A participant ID",
                "Annotations": {
                    "IsAbout": {"TermURL": "nb:ParticipantID", "Label": ""},
                    "Identifies": "participant"
                }
            },
            "sex": {
                "Description": "sex",
                "Levels": {"F": "female"},
                "Annotations": {
                    "IsAbout": {"TermURL": "nb:Sex", "Label": ""},
                    "Levels": {"F": {"TermURL": "snomed:248152002", "Label": ""}},
                    "MissingValues": ["n/a"]
                }
            },
            "age": {
                "Description": "age",
                "Units": "years",
                "Annotations": {
                    "IsAbout": {"TermURL": "nb:Age", "Label": ""},
                    "Transformation": {"TermURL": "nb:float", "Label": "float data"}
                }
            }
        });
        assert!(validate(dict).is_empty());
    }

    #[test]
    fn test_missing_description() {
        let observations = validate(json!({"age": {"Units": "years"}}));
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].column.as_deref(), Some("age"));
        assert_eq!(observations[0].evidence.path.as_deref(), Some("/age/Description"));
    }

    #[test]
    fn test_bad_annotations() {
        let observations = validate(json!({
            "sex": {
                "Description": "sex",
                "Annotations": {
                    "Levels": {"F": "snomed:248152002"},
                    "Transformation": {"TermURL": "nb:float", "Label": "float data"},
                    "MissingValues": "n/a"
                }
            }
        }));
        // missing IsAbout, bad level term, both shapes, bad MissingValues
        assert_eq!(observations.len(), 4);
        assert!(observations.iter().all(|o| o.severity == Severity::Warning));
    }

    #[test]
    fn test_non_object_dictionary() {
        assert!(!DictionarySchemaValidator::new().is_valid("ds", &json!([1])));
    }
}

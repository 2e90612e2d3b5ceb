//! Observation types for invariant and schema violations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of observation/issue detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationType {
    /// Two columns of one dataset carry the same controlled term.
    DuplicateControlledTerm,
    /// A dataset describes the same column twice.
    DuplicateColumn,
    /// A column lists the same level twice.
    DuplicateLevel,
    /// A data dictionary does not have the expected shape.
    SchemaViolation,
}

impl ObservationType {
    /// Get a human-readable label for the observation type.
    pub fn label(&self) -> &'static str {
        match self {
            ObservationType::DuplicateControlledTerm => "Duplicate Controlled Term",
            ObservationType::DuplicateColumn => "Duplicate Column",
            ObservationType::DuplicateLevel => "Duplicate Level",
            ObservationType::SchemaViolation => "Schema Violation",
        }
    }
}

/// Severity level of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// Evidence supporting an observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evidence {
    /// The problematic value(s).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Number of occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<usize>,
    /// JSON path of the offending node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expected value or shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
}

impl Evidence {
    /// Create empty evidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set occurrences.
    pub fn with_occurrences(mut self, count: usize) -> Self {
        self.occurrences = Some(count);
        self
    }

    /// Set the JSON path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set expected value.
    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

/// A detected violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Unique identifier for this observation.
    pub id: String,
    /// Type of issue.
    #[serde(rename = "type")]
    pub observation_type: ObservationType,
    /// Severity level.
    pub severity: Severity,
    /// Affected dataset.
    pub dataset: String,
    /// Affected column, if the issue is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Supporting evidence.
    pub evidence: Evidence,
    /// When detected.
    pub detected_at: DateTime<Utc>,
    /// What detected this issue.
    pub detector: String,
}

impl Observation {
    /// Create a new observation.
    pub fn new(
        observation_type: ObservationType,
        severity: Severity,
        dataset: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_observation_id(),
            observation_type,
            severity,
            dataset: dataset.into(),
            column: None,
            description: description.into(),
            evidence: Evidence::new(),
            detected_at: Utc::now(),
            detector: String::new(),
        }
    }

    /// Set the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the evidence.
    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Set the detector name.
    pub fn with_detector(mut self, detector: impl Into<String>) -> Self {
        self.detector = detector.into();
        self
    }
}

/// Generate a unique observation ID.
fn generate_observation_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("obs_{:03}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_observation() {
        let obs = Observation::new(
            ObservationType::DuplicateColumn,
            Severity::Error,
            "ds000001",
            "column 'age' described twice",
        )
        .with_column("age")
        .with_detector("column_validator");

        assert!(obs.id.starts_with("obs_"));
        assert_eq!(obs.severity, Severity::Error);
        assert_eq!(obs.column.as_deref(), Some("age"));
    }

    #[test]
    fn test_evidence_builder() {
        let evidence = Evidence::new()
            .with_value("nb:Age")
            .with_occurrences(2)
            .with_path("/age/Annotations");

        assert_eq!(evidence.occurrences, Some(2));
        assert_eq!(evidence.path.as_deref(), Some("/age/Annotations"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_serialized_type_is_snake_case() {
        let obs = Observation::new(ObservationType::DuplicateLevel, Severity::Error, "ds", "x");
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["type"], "duplicate_level");
        assert!(json.get("column").is_none());
    }
}

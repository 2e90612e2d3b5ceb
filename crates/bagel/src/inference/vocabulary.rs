//! Controlled-vocabulary matching for column names and contents.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::TableColumn;
use crate::schema::{ConceptTag, TypeTag};

static PARTICIPANT_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sub-[a-zA-Z0-9]*").unwrap());

/// Header of the participant identifier column in BIDS tables.
pub const PARTICIPANT_ID_COLUMN: &str = "participant_id";

/// Known raw column names for each concept, normalized to lower case.
static ALIASES: Lazy<HashMap<ConceptTag, HashSet<String>>> = Lazy::new(|| {
    let table: &[(ConceptTag, &[&str])] = &[
        (ConceptTag::ParticipantId, &["participant_id", "participant"]),
        (ConceptTag::SessionId, &["session", "session_id"]),
        (
            ConceptTag::Sex,
            &[
                "gender",
                "gender_f",
                "gender_identity_f",
                "gender_identity_m",
                "jsex",
                "rat_sex",
                "sex",
            ],
        ),
        (
            ConceptTag::Age,
            &[
                "age",
                "age (years)",
                "age_at_first_scan_years",
                "ageAtFirstScanYears",
                "age (5-year bins)",
                "age at baseline",
                "age at onset first cb use",
                "age at onset frequent cb use",
                "age_exam_ses01",
                "age_group",
                "age_ses-t1",
                "age_ses-t1_aanonword_run-01",
                "age_ses-t1_aanonword_run-02",
                "age_ses-t1_aaword_run-01",
                "age_ses-t1_aaword_run-02",
                "age_ses-t1_avnonword_run-01",
                "age_ses-t1_avnonword_run-02",
                "age_ses-t1_avword_run-01",
                "age_ses-t1_avword_run-02",
                "age_ses-t1_dwi",
                "age_ses-t1_phenotype",
                "age_ses-t1_t1w",
                "age_ses-t1_vvnonword_run-01",
                "age_ses-t1_vvnonword_run-02",
                "age_ses-t1_vvword_run-01",
                "age_ses-t1_vvword_run-02",
                "age_ses-t2",
                "age_ses-t2_phenotype",
                "age_ses-t2_t1w",
                "age_ses-t2_vvnonword_run-01",
                "age_ses-t2_vvnonword_run-02",
                "age_ses-t2_vvword_run-01",
                "age_ses-t2_vvword_run-02",
                "age_ses02",
                "age_sess1",
                "age_sess2",
                "ageatfirstscanyears",
                "agegroup",
                "rat_age",
            ],
        ),
        (
            ConceptTag::Handedness,
            &[
                "ehi",
                "edinburgh",
                "edinburgh_hand_l",
                "edinburgh_hand_r",
                "edinburgh_handedness",
                "edinburgh_lq",
                "hand",
                "handedness",
            ],
        ),
        (ConceptTag::Diagnosis, &["diagnosis"]),
        (ConceptTag::HealthyControl, &["healthy_control"]),
        (ConceptTag::Assessment, &["assessment_tool"]),
    ];

    table
        .iter()
        .map(|(concept, names)| (*concept, names.iter().map(|n| normalize(n)).collect()))
        .collect()
});

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Matches columns against the controlled vocabulary.
///
/// Only participant identifiers, ages and sex are tagged; the other concepts
/// exist in the alias table for lookups but have no recognizer yet.
#[derive(Debug, Clone, Default)]
pub struct VocabularyMatcher;

impl VocabularyMatcher {
    /// Create a matcher over the built-in alias table.
    pub fn new() -> Self {
        Self
    }

    /// Known aliases for a concept.
    pub fn aliases(&self, concept: ConceptTag) -> impl Iterator<Item = &'static str> {
        ALIASES
            .get(&concept)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    /// Returns true if `name` is a known alias of `concept`.
    pub fn is_alias(&self, concept: ConceptTag, name: &str) -> bool {
        ALIASES
            .get(&concept)
            .is_some_and(|names| names.contains(&normalize(name)))
    }

    /// Decide which concept, if any, a column represents.
    ///
    /// Recognizers run in order participant identifier, age, sex; the first
    /// hit wins.
    pub fn match_concept(&self, column: &TableColumn, inferred_type: TypeTag) -> Option<ConceptTag> {
        if self.is_participant_id(column) {
            Some(ConceptTag::ParticipantId)
        } else if self.is_age(&column.name, inferred_type) {
            Some(ConceptTag::Age)
        } else if self.is_sex(&column.name) {
            Some(ConceptTag::Sex)
        } else {
            None
        }
    }

    /// A `participant_id` column whose values all look like `sub-<label>`.
    pub fn is_participant_id(&self, column: &TableColumn) -> bool {
        if normalize(&column.name) != PARTICIPANT_ID_COLUMN || !column.storage.is_generic() {
            return false;
        }

        let mut values = column.non_missing().map(str::trim).peekable();
        values.peek().is_some() && values.all(|v| PARTICIPANT_VALUE.is_match(v))
    }

    /// An age alias carrying a numeric-compatible type.
    pub fn is_age(&self, name: &str, inferred_type: TypeTag) -> bool {
        self.is_alias(ConceptTag::Age, name) && inferred_type.is_age_compatible()
    }

    /// A sex alias. Values are not inspected.
    pub fn is_sex(&self, name: &str) -> bool {
        self.is_alias(ConceptTag::Sex, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StorageType;

    fn column(name: &str, values: &[&str]) -> TableColumn {
        TableColumn::new(name, values.iter().map(|v| Some(v.to_string())).collect())
    }

    #[test]
    fn test_participant_id() {
        let matcher = VocabularyMatcher::new();
        let col = column("participant_id", &["sub-01", " sub-02 "]);
        assert_eq!(matcher.match_concept(&col, TypeTag::Object), Some(ConceptTag::ParticipantId));

        let col = column("Participant_ID ", &["sub-01"]);
        assert!(matcher.is_participant_id(&col));

        let col = column("participant_id", &["sub-01", "02"]);
        assert!(!matcher.is_participant_id(&col));
    }

    #[test]
    fn test_date_column_is_not_participant_id() {
        let matcher = VocabularyMatcher::new();
        let col = column("acq_date", &["2021-01-04", "2021-03-12"]).with_storage(StorageType::DateTime);
        assert_eq!(matcher.match_concept(&col, TypeTag::DateTime), None);
    }

    #[test]
    fn test_age_requires_numeric_type() {
        let matcher = VocabularyMatcher::new();
        let col = column("Age", &["23", "41"]);
        assert_eq!(matcher.match_concept(&col, TypeTag::Int64), Some(ConceptTag::Age));
        assert_eq!(matcher.match_concept(&col, TypeTag::Object), None);

        let col = column("ageAtFirstScanYears", &["23Y"]);
        assert_eq!(
            matcher.match_concept(&col, TypeTag::AgeWithYearSuffix),
            Some(ConceptTag::Age)
        );
    }

    #[test]
    fn test_sex_by_name_only() {
        let matcher = VocabularyMatcher::new();
        let col = column(" Gender", &["anything"]);
        assert_eq!(matcher.match_concept(&col, TypeTag::Object), Some(ConceptTag::Sex));
    }

    #[test]
    fn test_exact_alias_match_only() {
        let matcher = VocabularyMatcher::new();
        assert!(!matcher.is_alias(ConceptTag::Sex, "sex_of_participant"));
        assert!(matcher.is_alias(ConceptTag::Handedness, "EHI"));
        assert!(matcher.aliases(ConceptTag::Diagnosis).any(|a| a == "diagnosis"));
    }
}

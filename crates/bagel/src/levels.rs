//! Level reconciliation: which categorical values of a column get listed.
//!
//! Levels declared in a data dictionary are listed first with their labels,
//! followed by values observed in the data that the dictionary does not
//! declare. Some columns are never enumerated; see [`SkipReason`].

use std::collections::HashSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::schema::{ColumnDescriptor, ConceptTag, LevelRecord, TypeTag};

/// Columns with more distinct values than this are not categorical.
pub const MAX_NB_LEVELS: usize = 15;

/// Observed values that denote absence rather than a category.
pub const MISSING_SENTINELS: &[&str] = &["n/a", "nan"];

/// Column names whose values are never worth listing: dates, identifiers,
/// anthropometrics and timings.
static COLUMNS_TO_SKIP: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a_date",
        "birthdate_shifted",
        "dataset_id",
        "date",
        "date_of_scan",
        "date_run",
        "dob",
        "ftcd-fmri-delay-days",
        "guid",
        "height",
        "height_in",
        "height_ft",
        "height_inches",
        "height (cm)",
        "hf (/min)",
        "institution",
        "scan_time",
        "session_id",
        "time",
        "time_after_stroke",
        "weight",
        "weight (lbs)",
        "weight (kg)",
        "years_of_education",
    ]
    .into_iter()
    .collect()
});

/// Returns true if `name` is on the fixed exclusion list.
pub fn is_excluded_name(name: &str) -> bool {
    COLUMNS_TO_SKIP.contains(name.trim().to_lowercase().as_str())
}

/// Strip the trailing whitespace and commas left by data entry.
pub fn normalize_level(value: &str) -> String {
    value.trim_end().trim_end_matches(',').trim_end().to_string()
}

/// Returns true for values that mark a missing cell.
pub fn is_missing_sentinel(value: &str) -> bool {
    let value = value.trim();
    MISSING_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(value))
}

/// Why a column's levels are not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The column name is on the exclusion list.
    ExcludedName,
    /// Identifiers and ages are never categorical.
    ControlledTerm(ConceptTag),
    /// The inferred type is numeric, boolean or temporal.
    ContinuousType(TypeTag),
    /// The column has more distinct values than the threshold.
    TooManyLevels(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ExcludedName => write!(f, "excluded column name"),
            SkipReason::ControlledTerm(term) => write!(f, "controlled term {}", term),
            SkipReason::ContinuousType(tag) => write!(f, "continuous type {}", tag),
            SkipReason::TooManyLevels(n) => write!(f, "{} levels", n),
        }
    }
}

/// The levels to list for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Declared levels, in declaration order, with their labels.
    pub declared: Vec<LevelRecord>,
    /// Observed levels absent from the declaration, in first-seen order.
    pub undeclared: Vec<LevelRecord>,
}

impl Reconciliation {
    /// Returns true if the data holds nothing the dictionary does not declare.
    pub fn is_noop(&self) -> bool {
        self.undeclared.is_empty()
    }

    /// Total number of levels.
    pub fn len(&self) -> usize {
        self.declared.len() + self.undeclared.len()
    }

    /// Returns true if there is nothing to list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records, declared first.
    pub fn into_records(self) -> Vec<LevelRecord> {
        let mut records = self.declared;
        records.extend(self.undeclared);
        records
    }
}

/// Compare observed values with declared levels.
///
/// Both sides are normalized before comparison. Missing sentinels are never
/// reported as undeclared levels.
pub fn reconcile_levels<I, S>(observed: I, declared: &IndexMap<String, String>) -> Reconciliation
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: IndexSet<String> = IndexSet::new();
    let declared: Vec<LevelRecord> = declared
        .iter()
        .filter_map(|(value, label)| {
            let value = normalize_level(value);
            seen.insert(value.clone())
                .then(|| LevelRecord::declared(value, label.clone()))
        })
        .collect();

    let undeclared = observed
        .into_iter()
        .map(|v| normalize_level(v.as_ref()))
        .filter(|v| !is_missing_sentinel(v))
        .filter(|v| seen.insert(v.clone()))
        .map(LevelRecord::undeclared)
        .collect();

    Reconciliation {
        declared,
        undeclared,
    }
}

/// Applies the skip policy and reconciles levels.
#[derive(Debug, Clone)]
pub struct LevelReconciler {
    max_levels: usize,
}

impl LevelReconciler {
    /// Create a reconciler with the default cardinality threshold.
    pub fn new() -> Self {
        Self::with_max_levels(MAX_NB_LEVELS)
    }

    /// Create a reconciler with a custom cardinality threshold.
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self { max_levels }
    }

    /// The cardinality threshold.
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Decide whether a column's levels are skipped.
    pub fn skip_reason(&self, column: &ColumnDescriptor) -> Option<SkipReason> {
        if is_excluded_name(&column.name) {
            return Some(SkipReason::ExcludedName);
        }
        if let Some(term @ (ConceptTag::ParticipantId | ConceptTag::Age)) = column.controlled_term {
            return Some(SkipReason::ControlledTerm(term));
        }
        if column.inferred_type.is_continuous() {
            return Some(SkipReason::ContinuousType(column.inferred_type));
        }
        if column.nb_levels > self.max_levels {
            return Some(SkipReason::TooManyLevels(column.nb_levels));
        }
        None
    }

    /// Levels to list for a column, or nothing if the column is skipped.
    pub fn levels_for<I, S>(
        &self,
        column: &ColumnDescriptor,
        observed: I,
        declared: &IndexMap<String, String>,
    ) -> Vec<LevelRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(reason) = self.skip_reason(column) {
            debug!(column = %column.name, %reason, "skipping column");
            return Vec::new();
        }

        let reconciliation = reconcile_levels(observed, declared);
        if !reconciliation.is_noop() {
            let undeclared: Vec<&str> = reconciliation
                .undeclared
                .iter()
                .map(|l| l.value.as_str())
                .collect();
            info!(column = %column.name, ?undeclared, "undeclared levels");
        }

        reconciliation.into_records()
    }
}

impl Default for LevelReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn values(records: &[LevelRecord]) -> Vec<&str> {
        records.iter().map(|r| r.value.as_str()).collect()
    }

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("M,"), "M");
        assert_eq!(normalize_level("M , "), "M");
        assert_eq!(normalize_level("  F"), "  F");
        assert_eq!(normalize_level("a,b"), "a,b");
    }

    #[test]
    fn test_undeclared_after_declared() {
        let result = reconcile_levels(
            ["F", "M", "M,", "X"],
            &declared(&[("F", "female"), ("M", "male")]),
        );

        assert_eq!(values(&result.declared), vec!["F", "M"]);
        assert_eq!(result.declared[0].description.as_deref(), Some("female"));
        assert_eq!(values(&result.undeclared), vec!["X"]);
        assert_eq!(result.undeclared[0].description, None);
    }

    #[test]
    fn test_sentinels_never_undeclared() {
        let result = reconcile_levels(["a", "n/a", "nan", "NaN"], &IndexMap::new());
        assert_eq!(values(&result.undeclared), vec!["a"]);
    }

    #[test]
    fn test_declared_sentinel_is_kept() {
        let result = reconcile_levels(["1"], &declared(&[("n/a", "not available")]));
        assert_eq!(values(&result.declared), vec!["n/a"]);
        assert_eq!(values(&result.undeclared), vec!["1"]);
    }

    #[test]
    fn test_noop_when_everything_declared() {
        let result = reconcile_levels(["L", "R"], &declared(&[("L", "left"), ("R", "right")]));
        assert!(result.is_noop());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_skip_policy() {
        let reconciler = LevelReconciler::new();

        let column = ColumnDescriptor::new("ds", "Weight", TypeTag::Object, 3, 2);
        assert_eq!(reconciler.skip_reason(&column), Some(SkipReason::ExcludedName));

        let mut column = ColumnDescriptor::new("ds", "age_group", TypeTag::Range, 3, 2);
        column.controlled_term = Some(ConceptTag::Age);
        assert_eq!(
            reconciler.skip_reason(&column),
            Some(SkipReason::ControlledTerm(ConceptTag::Age))
        );

        let column = ColumnDescriptor::new("ds", "smoker", TypeTag::YesNo, 3, 2);
        assert_eq!(
            reconciler.skip_reason(&column),
            Some(SkipReason::ContinuousType(TypeTag::YesNo))
        );

        let column = ColumnDescriptor::new("ds", "site", TypeTag::Object, 40, 16);
        assert_eq!(reconciler.skip_reason(&column), Some(SkipReason::TooManyLevels(16)));

        let column = ColumnDescriptor::new("ds", "site", TypeTag::Object, 40, 15);
        assert_eq!(reconciler.skip_reason(&column), None);

        let mut column = ColumnDescriptor::new("ds", "sex", TypeTag::Object, 3, 2);
        column.controlled_term = Some(ConceptTag::Sex);
        assert_eq!(reconciler.skip_reason(&column), None);
    }

    #[test]
    fn test_skipped_column_lists_nothing() {
        let reconciler = LevelReconciler::new();
        let column = ColumnDescriptor::new("ds", "date", TypeTag::Object, 2, 2);
        let records = reconciler.levels_for(&column, ["x"], &declared(&[("x", "y")]));
        assert!(records.is_empty());
    }

    #[test]
    fn test_session_id_and_institution_excluded() {
        assert!(is_excluded_name("session_id"));
        assert!(is_excluded_name(" Institution"));
        assert!(!is_excluded_name("group"));
    }
}

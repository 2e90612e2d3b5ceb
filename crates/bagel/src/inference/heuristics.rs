//! Heuristic column typing.
//!
//! Generic (text) columns are run through an ordered chain of predicates; the
//! first predicate that accepts the column decides its [`TypeTag`]. Columns
//! with concrete storage keep their native tag.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::TableColumn;
use crate::schema::{StorageType, TypeTag};

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static EURO_CHARSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[- 0-9,]*$").unwrap());
static EURO_DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-? ?[0-9]+,[0-9]+$").unwrap());
static INT_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]*$|^[.-]$").unwrap());
static BOUNDED_CHARSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+0-9.]*$").unwrap());
static BOUNDED_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]*)?\+$").unwrap());
static RANGE_CHARSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-0-9]*$").unwrap());
static RANGE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+-[0-9]+$").unwrap());
static AGE_WITH_Y: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+Y$").unwrap());

const YES_NO_VALUES: &[&str] = &["no", "yes", "y", "n", "0", "1"];

/// The non-missing content of a column, as seen by the predicates.
#[derive(Debug, Clone)]
pub struct ColumnSample<'a> {
    /// Storage the column was loaded with.
    pub storage: StorageType,
    /// Distinct stripped values.
    pub values: IndexSet<&'a str>,
}

impl<'a> ColumnSample<'a> {
    /// Sample a column, dropping missing values.
    pub fn from_column(column: &'a TableColumn) -> Self {
        Self {
            storage: column.storage,
            values: column.non_missing().map(str::trim).collect(),
        }
    }

    fn all(&self, pattern: &Regex) -> bool {
        self.values.iter().all(|v| pattern.is_match(v))
    }

    fn any(&self, pattern: &Regex) -> bool {
        self.values.iter().any(|v| pattern.is_match(v))
    }

    fn all_numeric_in(&self, allowed: &[f64]) -> bool {
        self.values
            .iter()
            .all(|v| v.parse::<f64>().is_ok_and(|n| allowed.contains(&n)))
    }
}

/// A predicate deciding whether a column carries a given type.
pub type Heuristic = fn(&ColumnSample<'_>) -> bool;

/// Binary columns: yes/no, y/n or 0/1 in any case.
pub fn is_yes_no(sample: &ColumnSample<'_>) -> bool {
    let textual = sample
        .values
        .iter()
        .all(|v| YES_NO_VALUES.contains(&v.to_lowercase().as_str()));

    textual
        || (matches!(sample.storage, StorageType::Int64 | StorageType::Float64)
            && sample.all_numeric_in(&[0.0, 1.0]))
}

/// Decimal numbers written with a comma separator.
pub fn is_euro_decimal(sample: &ColumnSample<'_>) -> bool {
    sample.all(&EURO_CHARSET) && sample.any(&EURO_DECIMAL)
}

/// Integers, possibly padded with single `.` or `-` placeholders.
pub fn is_int(sample: &ColumnSample<'_>) -> bool {
    sample.storage == StorageType::Int64 || sample.all(&INT_LIKE)
}

/// Native floating-point values.
pub fn is_float(sample: &ColumnSample<'_>) -> bool {
    sample.storage == StorageType::Float64
}

/// Numbers with at least one open upper bound such as `65+`.
pub fn is_bounded(sample: &ColumnSample<'_>) -> bool {
    sample.all(&BOUNDED_CHARSET) && sample.any(&BOUNDED_VALUE)
}

/// Integers with at least one dash-separated range such as `18-25`.
pub fn is_range(sample: &ColumnSample<'_>) -> bool {
    sample.all(&RANGE_CHARSET) && sample.any(&RANGE_VALUE)
}

/// Ages written with a trailing `Y`.
pub fn is_age_with_year_suffix(sample: &ColumnSample<'_>) -> bool {
    sample.all(&AGE_WITH_Y)
}

/// Infers column types with an ordered chain of heuristics.
pub struct TypeInference {
    heuristics: Vec<(TypeTag, Heuristic)>,
}

impl TypeInference {
    /// Create the engine with the standard heuristic chain.
    pub fn new() -> Self {
        Self {
            heuristics: Self::build_heuristics(),
        }
    }

    /// Create an engine with a custom heuristic chain.
    pub fn with_heuristics(heuristics: Vec<(TypeTag, Heuristic)>) -> Self {
        Self { heuristics }
    }

    /// The standard chain. Specific encodings come before plain numbers so
    /// that `0/1` and `1,5` are not read as integers.
    fn build_heuristics() -> Vec<(TypeTag, Heuristic)> {
        vec![
            (TypeTag::YesNo, is_yes_no as Heuristic),
            (TypeTag::EuroDecimal, is_euro_decimal as Heuristic),
            (TypeTag::Int, is_int as Heuristic),
            (TypeTag::Float, is_float as Heuristic),
            (TypeTag::Bounded, is_bounded as Heuristic),
            (TypeTag::Range, is_range as Heuristic),
            (TypeTag::AgeWithYearSuffix, is_age_with_year_suffix as Heuristic),
        ]
    }

    /// The heuristic chain in evaluation order.
    pub fn heuristics(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.heuristics.iter().map(|(tag, _)| *tag)
    }

    /// Infer the type of a column.
    ///
    /// Concrete storage is returned unchanged. A column with no non-missing
    /// values keeps its storage tag rather than vacuously matching a
    /// heuristic.
    pub fn infer(&self, column: &TableColumn) -> TypeTag {
        let native = TypeTag::from(column.storage);
        if !column.storage.is_generic() {
            return native;
        }

        let sample = ColumnSample::from_column(column);
        if sample.values.is_empty() {
            return native;
        }

        self.heuristics
            .iter()
            .find(|(_, heuristic)| heuristic(&sample))
            .map(|(tag, _)| *tag)
            .unwrap_or(native)
    }
}

impl Default for TypeInference {
    fn default() -> Self {
        Self::new()
    }
}

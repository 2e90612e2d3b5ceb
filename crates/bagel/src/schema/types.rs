//! Core type definitions for column typing and controlled terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a column is physically stored once the table is loaded.
///
/// A column is only `Object` when its values could not all be read as one
/// of the concrete types; the type heuristics only ever look at `Object`
/// columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Untyped text.
    Object,
    /// Every non-missing value is an integer.
    Int64,
    /// Every non-missing value is a floating-point number.
    Float64,
    /// Every non-missing value is `True`/`False`.
    Bool,
    /// Every non-missing value parsed as a date or timestamp.
    DateTime,
}

impl StorageType {
    /// Returns true for the generic storage the heuristics operate on.
    pub fn is_generic(&self) -> bool {
        matches!(self, StorageType::Object)
    }
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::Object
    }
}

impl From<StorageType> for TypeTag {
    fn from(storage: StorageType) -> Self {
        match storage {
            StorageType::Object => TypeTag::Object,
            StorageType::Int64 => TypeTag::Int64,
            StorageType::Float64 => TypeTag::Float64,
            StorageType::Bool => TypeTag::Bool,
            StorageType::DateTime => TypeTag::DateTime,
        }
    }
}

/// Inferred type of a column.
///
/// Native tags mirror [`StorageType`]; the remaining tags are produced by
/// the heuristic chain in [`crate::inference::TypeInference`]. The string
/// form (see [`TypeTag::as_str`]) is what appears in the `type` column of
/// the annotation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Generic storage, no heuristic matched.
    Object,
    /// Native integer storage.
    Int64,
    /// Native floating-point storage.
    Float64,
    /// Native boolean storage.
    Bool,
    /// Native date/time storage.
    DateTime,
    /// Binary yes/no (or 0/1) values.
    YesNo,
    /// Decimal numbers written with a comma separator (`"1,5"`).
    EuroDecimal,
    /// Integers stored as text, possibly with `.` or `-` placeholders.
    Int,
    /// Floating-point numbers stored as text.
    Float,
    /// Numbers with an open upper bound (`"65+"`).
    Bounded,
    /// Dash-separated numeric ranges (`"18-25"`).
    Range,
    /// Ages written with a trailing `Y` (`"34Y"`).
    AgeWithYearSuffix,
}

impl TypeTag {
    /// Every tag, in no particular order.
    pub const ALL: [TypeTag; 12] = [
        TypeTag::Object,
        TypeTag::Int64,
        TypeTag::Float64,
        TypeTag::Bool,
        TypeTag::DateTime,
        TypeTag::YesNo,
        TypeTag::EuroDecimal,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Bounded,
        TypeTag::Range,
        TypeTag::AgeWithYearSuffix,
    ];

    /// The tag as written in annotation tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Object => "object",
            TypeTag::Int64 => "int64",
            TypeTag::Float64 => "float64",
            TypeTag::Bool => "bool",
            TypeTag::DateTime => "datetime64[ns]",
            TypeTag::YesNo => "yes_no",
            TypeTag::EuroDecimal => "nb:euro",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bounded => "nb:bounded",
            TypeTag::Range => "nb:range",
            TypeTag::AgeWithYearSuffix => "ageY",
        }
    }

    /// Parse a tag from an annotation table.
    ///
    /// Accepts the table spelling as well as the descriptive snake_case
    /// names. `"n/a"` is read as [`TypeTag::Object`]. Anything else is
    /// unknown and yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        let tag = match s.trim() {
            "object" | "n/a" | "str" => TypeTag::Object,
            "int64" => TypeTag::Int64,
            "float64" => TypeTag::Float64,
            "bool" => TypeTag::Bool,
            "datetime64[ns]" | "datetime" => TypeTag::DateTime,
            "yes_no" | "yes/no" => TypeTag::YesNo,
            "nb:euro" | "euro" | "euro_decimal" => TypeTag::EuroDecimal,
            "int" => TypeTag::Int,
            "float" => TypeTag::Float,
            "nb:bounded" | "bounded" => TypeTag::Bounded,
            "nb:range" | "range" => TypeTag::Range,
            "ageY" | "age_with_year_suffix" => TypeTag::AgeWithYearSuffix,
            _ => return None,
        };
        Some(tag)
    }

    /// Returns true if this tag describes a native storage type.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            TypeTag::Object | TypeTag::Int64 | TypeTag::Float64 | TypeTag::Bool | TypeTag::DateTime
        )
    }

    /// Returns true for types whose values are never enumerated as levels.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            TypeTag::Float64
                | TypeTag::Int64
                | TypeTag::YesNo
                | TypeTag::Bool
                | TypeTag::Int
                | TypeTag::Float
                | TypeTag::Range
                | TypeTag::Bounded
                | TypeTag::EuroDecimal
                | TypeTag::DateTime
        )
    }

    /// Returns true for types an age column may legitimately carry.
    pub fn is_age_compatible(&self) -> bool {
        matches!(
            self,
            TypeTag::Float64
                | TypeTag::Int64
                | TypeTag::Int
                | TypeTag::Float
                | TypeTag::Bounded
                | TypeTag::EuroDecimal
                | TypeTag::AgeWithYearSuffix
        )
    }
}

impl Default for TypeTag {
    fn default() -> Self {
        TypeTag::Object
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TypeTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TypeTag::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown column type '{}'", s)))
    }
}

/// Controlled-vocabulary concept a column can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConceptTag {
    #[serde(rename = "nb:ParticipantID")]
    ParticipantId,
    #[serde(rename = "nb:SessionID")]
    SessionId,
    #[serde(rename = "nb:Sex")]
    Sex,
    #[serde(rename = "nb:Age")]
    Age,
    #[serde(rename = "handedness")]
    Handedness,
    #[serde(rename = "nb:Diagnosis")]
    Diagnosis,
    #[serde(rename = "purl:NCIT_C94342")]
    HealthyControl,
    #[serde(rename = "nb:Assessment")]
    Assessment,
}

impl ConceptTag {
    /// Every concept known to the vocabulary.
    pub const ALL: [ConceptTag; 8] = [
        ConceptTag::ParticipantId,
        ConceptTag::SessionId,
        ConceptTag::Sex,
        ConceptTag::Age,
        ConceptTag::Handedness,
        ConceptTag::Diagnosis,
        ConceptTag::HealthyControl,
        ConceptTag::Assessment,
    ];

    /// The controlled term URL for this concept.
    pub fn term(&self) -> &'static str {
        match self {
            ConceptTag::ParticipantId => "nb:ParticipantID",
            ConceptTag::SessionId => "nb:SessionID",
            ConceptTag::Sex => "nb:Sex",
            ConceptTag::Age => "nb:Age",
            ConceptTag::Handedness => "handedness",
            ConceptTag::Diagnosis => "nb:Diagnosis",
            ConceptTag::HealthyControl => "purl:NCIT_C94342",
            ConceptTag::Assessment => "nb:Assessment",
        }
    }

    /// Look a concept up by its controlled term.
    pub fn from_term(term: &str) -> Option<Self> {
        let term = term.trim();
        Self::ALL.into_iter().find(|c| c.term() == term)
    }
}

impl fmt::Display for ConceptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.term())
    }
}

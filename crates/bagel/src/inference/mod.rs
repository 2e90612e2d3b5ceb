//! Column typing and vocabulary matching.

mod dates;
mod heuristics;
mod vocabulary;

pub use dates::DateDetector;
pub use heuristics::{
    is_age_with_year_suffix, is_bounded, is_euro_decimal, is_float, is_int, is_range, is_yes_no,
    ColumnSample, Heuristic, TypeInference,
};
pub use vocabulary::{VocabularyMatcher, PARTICIPANT_ID_COLUMN};

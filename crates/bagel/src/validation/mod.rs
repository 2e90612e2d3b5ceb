//! Invariant checks over pipeline outputs.

mod observation;
mod sanity;
mod schema;

pub use observation::{Evidence, Observation, ObservationType, Severity};
pub use sanity::{ColumnValidator, ControlledTermValidator, LevelValidator, SanityChecker, Validator};
pub use schema::DictionarySchemaValidator;

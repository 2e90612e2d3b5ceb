//! Input parsing and data source handling.

mod corpus;
mod dictionary;
mod parser;
mod source;

pub use corpus::{dataset_name, CorpusIndex, DatasetMetadata};
pub use dictionary::DataDictionary;
pub use parser::{Parser, ParserConfig, DEFAULT_NA_VALUES};
pub use source::{ParticipantsTable, SourceMetadata, TableColumn};

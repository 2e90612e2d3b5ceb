//! Schema types for column descriptors and the annotation output tables.

mod column;
mod table;
mod types;

pub use column::{ColumnDescriptor, LevelRecord, NOT_AVAILABLE};
pub use table::{parse_flag, ColumnsRow, LevelsRow, LevelsTable};
pub use types::{ConceptTag, StorageType, TypeTag};

//! Annotation-to-dictionary compilation.
//!
//! Reviewed annotation tables list, per dataset and column, a header row and
//! optional level rows. Each column is classified into a [`ColumnShape`] and
//! described accordingly; the description is merged into the dataset's
//! existing data dictionary without discarding fields it does not set.

mod compiler;
mod decision;
mod merge;
mod shape;

pub use compiler::{
    add_description, add_description_file, CompileReport, CompiledDictionary, DictionaryCompiler,
    ADDED_DESCRIPTION, FILLER_DESCRIPTION,
};
pub use decision::{AnnotationRow, AnnotationTable, ColumnGroup, Decision};
pub use merge::merge;
pub use shape::{
    describe, is_tool_reference, transformation, ColumnShape, IDENTIFIES_PARTICIPANT,
    MISSING_VALUE_TERM, TOOL_NAMESPACES,
};

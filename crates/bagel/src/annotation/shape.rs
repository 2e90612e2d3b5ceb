//! How an annotated column is described in a data dictionary.

use indexmap::IndexSet;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::levels::normalize_level;
use crate::schema::{ConceptTag, TypeTag};

use super::decision::{ColumnGroup, Decision};

/// Controlled term marking a level as a missing-value code.
pub const MISSING_VALUE_TERM: &str = "nb:MissingValue";

/// Namespaces of external assessment-tool vocabularies.
pub const TOOL_NAMESPACES: &[&str] = &["cogatlas:", "snomed:"];

/// Value of `Identifies` for participant identifier columns.
pub const IDENTIFIES_PARTICIPANT: &str = "participant";

/// The description shape chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    /// Rejected by the reviewer; the dictionary entry is left alone.
    Dropped,
    /// Identifies participants.
    Identifying,
    /// Categorical, with one annotation per level.
    Discrete,
    /// Part of an external assessment tool.
    ToolLinked,
    /// Anything else, described by a value transformation.
    Continuous,
}

impl ColumnShape {
    /// Choose the shape for a group. Groups without a header row have none.
    pub fn classify(group: &ColumnGroup) -> Option<Self> {
        let header = group.header()?;

        let shape = if header.decision == Decision::Drop {
            ColumnShape::Dropped
        } else if header.controlled_term == ConceptTag::ParticipantId.term() {
            ColumnShape::Identifying
        } else if group.has_levels() {
            ColumnShape::Discrete
        } else if is_tool_reference(&header.is_part_of) {
            ColumnShape::ToolLinked
        } else {
            ColumnShape::Continuous
        };
        Some(shape)
    }
}

/// Returns true if `is_part_of` names a term of a known tool vocabulary.
pub fn is_tool_reference(is_part_of: &str) -> bool {
    let is_part_of = is_part_of.trim();
    TOOL_NAMESPACES
        .iter()
        .any(|ns| is_part_of.len() > ns.len() && is_part_of.starts_with(ns))
}

/// Term and label of the transformation for a continuous type.
pub fn transformation(tag: TypeTag) -> Option<(&'static str, &'static str)> {
    match tag {
        TypeTag::Float64 => Some(("nb:float", "float data")),
        TypeTag::Int64 => Some(("nb:int", "integer data")),
        TypeTag::Bounded => Some(("nb:bounded", "bounded value")),
        TypeTag::EuroDecimal => Some(("nb:euro", "european decimal value")),
        _ => None,
    }
}

fn term(url: &str) -> Value {
    json!({"TermURL": url, "Label": ""})
}

/// Build the `Annotations` entry computed for a column group.
///
/// Returns `None` for dropped columns and for continuous columns whose type
/// has no known transformation.
pub fn describe(group: &ColumnGroup) -> Option<Value> {
    let shape = ColumnShape::classify(group)?;
    let header = group.header()?;

    let mut annotations = Map::new();
    match shape {
        ColumnShape::Dropped => return None,
        ColumnShape::Identifying => {
            annotations.insert("IsAbout".into(), term(&header.controlled_term));
            annotations.insert("Identifies".into(), json!(IDENTIFIES_PARTICIPANT));
        }
        ColumnShape::Discrete => {
            annotations.insert("IsAbout".into(), term(&header.controlled_term));

            let mut levels = Map::new();
            let mut missing: IndexSet<String> = IndexSet::new();
            for row in group.levels() {
                let value = normalize_level(&row.value);
                if row.controlled_term == MISSING_VALUE_TERM {
                    missing.insert(value);
                } else if !levels.contains_key(&value) {
                    levels.insert(value, term(&row.controlled_term));
                }
            }

            annotations.insert("Levels".into(), Value::Object(levels));
            if !missing.is_empty() {
                annotations.insert("MissingValues".into(), json!(missing));
            }
            if is_tool_reference(&header.is_part_of) {
                annotations.insert("IsPartOf".into(), term(header.is_part_of.trim()));
            }
        }
        ColumnShape::ToolLinked => {
            annotations.insert("IsAbout".into(), term(&header.controlled_term));
            annotations.insert("IsPartOf".into(), term(header.is_part_of.trim()));
        }
        ColumnShape::Continuous => {
            let recorded = header.column_type.as_deref().unwrap_or_default();
            let Some((url, label)) = TypeTag::parse(recorded).and_then(transformation) else {
                warn!(
                    column = %group.column,
                    column_type = %recorded,
                    "no transformation for type, leaving column unannotated"
                );
                return None;
            };
            annotations.insert("IsAbout".into(), term(&header.controlled_term));
            annotations.insert("Transformation".into(), json!({"TermURL": url, "Label": label}));
        }
    }

    Some(json!({"Annotations": annotations}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::decision::AnnotationRow;

    fn group(rows: Vec<AnnotationRow>) -> ColumnGroup {
        ColumnGroup {
            column: rows[0].column.clone(),
            rows,
        }
    }

    #[test]
    fn test_classification_order() {
        let dropped = group(vec![
            AnnotationRow::header("ds", "participant_id", "nb:ParticipantID").with_decision(Decision::Drop),
        ]);
        assert_eq!(ColumnShape::classify(&dropped), Some(ColumnShape::Dropped));

        let ident = group(vec![AnnotationRow::header("ds", "participant_id", "nb:ParticipantID")]);
        assert_eq!(ColumnShape::classify(&ident), Some(ColumnShape::Identifying));

        let tool = group(vec![
            AnnotationRow::header("ds", "tool1", "nb:Assessment").with_part_of("cogatlas:trm_56a9137d9dce1"),
        ]);
        assert_eq!(ColumnShape::classify(&tool), Some(ColumnShape::ToolLinked));

        let levels_only = group(vec![AnnotationRow::level("ds", "sex", "F", "snomed:248152002")]);
        assert_eq!(ColumnShape::classify(&levels_only), None);
    }

    #[test]
    fn test_tool_reference() {
        assert!(is_tool_reference("cogatlas:trm_56a9137d9dce1"));
        assert!(is_tool_reference(" snomed:273249006"));
        assert!(!is_tool_reference(""));
        assert!(!is_tool_reference("cogatlas:"));
        assert!(!is_tool_reference("n/a"));
    }

    #[test]
    fn test_continuous_description() {
        let age = group(vec![AnnotationRow::header("ds", "age", "nb:Age").with_type("float64")]);
        assert_eq!(
            describe(&age),
            Some(json!({"Annotations": {
                "IsAbout": {"TermURL": "nb:Age", "Label": ""},
                "Transformation": {"TermURL": "nb:float", "Label": "float data"}
            }}))
        );
    }

    #[test]
    fn test_unknown_type_has_no_annotations() {
        let age = group(vec![
            AnnotationRow::header("ds", "age", "nb:Age").with_type("nonsense_heuristic"),
        ]);
        assert_eq!(describe(&age), None);
    }

    #[test]
    fn test_transformation_table() {
        assert_eq!(transformation(TypeTag::Int64).map(|t| t.0), Some("nb:int"));
        assert_eq!(transformation(TypeTag::Bounded).map(|t| t.0), Some("nb:bounded"));
        assert_eq!(transformation(TypeTag::EuroDecimal).map(|t| t.0), Some("nb:euro"));
        assert_eq!(transformation(TypeTag::Object), None);
    }

    #[test]
    fn test_discrete_levels_are_normalized() {
        let sex = group(vec![
            AnnotationRow::header("ds", "sex", "nb:Sex"),
            AnnotationRow::level("ds", "sex", "F", "snomed:248152002"),
            AnnotationRow::level("ds", "sex", "M", "snomed:248153007"),
            AnnotationRow::level("ds", "sex", "M,", "snomed:248153007"),
            AnnotationRow::level("ds", "sex", "nan", MISSING_VALUE_TERM),
        ]);
        let described = describe(&sex).unwrap();
        let annotations = &described["Annotations"];

        let levels = annotations["Levels"].as_object().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels["M"]["TermURL"], "snomed:248153007");
        assert_eq!(annotations["MissingValues"], json!(["nan"]));
        assert!(annotations.get("IsPartOf").is_none());
    }
}

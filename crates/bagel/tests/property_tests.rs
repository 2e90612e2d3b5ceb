//! Property-based tests for Bagel.
//!
//! These tests use proptest to generate random inputs and verify that the
//! inference, reconciliation and merge steps keep their invariants.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p bagel --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p bagel --test property_tests
//! ```

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::{Map, Value};

use bagel::annotation::merge;
use bagel::inference::TypeInference;
use bagel::input::TableColumn;
use bagel::levels::{normalize_level, reconcile_levels};
use bagel::TypeTag;

// =============================================================================
// Test Strategies
// =============================================================================

/// Binary answers in any case, padded with whitespace.
fn yes_no_value() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            Just("yes"),
            Just("no"),
            Just("y"),
            Just("n"),
            Just("0"),
            Just("1")
        ],
        any::<bool>(),
        "[ ]{0,2}",
        "[ ]{0,2}",
    )
        .prop_map(|(v, upper, pre, post)| {
            let v = if upper { v.to_uppercase() } else { v.to_string() };
            format!("{}{}{}", pre, v, post)
        })
}

/// A dash-separated range.
fn range_value() -> impl Strategy<Value = String> {
    (0u32..120, 0u32..120).prop_map(|(a, b)| format!("{}-{}", a, b))
}

/// Values the range charset allows.
fn range_filler() -> impl Strategy<Value = String> {
    "[0-9]{1,3}|[0-9]{1,2}-[0-9]{1,2}"
}

/// Categorical labels that survive normalization unchanged.
fn level_label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_]{0,10}".prop_filter("not a missing sentinel", |s| {
        !s.eq_ignore_ascii_case("nan")
    })
}

/// Small JSON objects, nested up to two levels.
fn json_object() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        "[a-z]{0,8}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
    .boxed();
    let inner = prop::collection::btree_map("[a-z]{1,4}", leaf.clone(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()));
    prop::collection::btree_map("[a-z]{1,4}", prop_oneof![leaf, inner], 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn column(values: Vec<String>) -> TableColumn {
    TableColumn::new("col", values.into_iter().map(Some).collect())
}

/// Paths to every leaf of a JSON object.
fn leaf_paths(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(key.clone());
                leaf_paths(child, prefix, out);
                prefix.pop();
            }
        }
        _ => out.push(prefix.clone()),
    }
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

// =============================================================================
// Type Inference Properties
// =============================================================================

proptest! {
    #[test]
    fn yes_no_columns_are_yes_no(values in prop::collection::vec(yes_no_value(), 1..30)) {
        prop_assert_eq!(TypeInference::new().infer(&column(values)), TypeTag::YesNo);
    }

    #[test]
    fn range_columns_are_range(
        range in range_value(),
        fillers in prop::collection::vec(range_filler(), 0..20),
    ) {
        let mut values = fillers;
        values.push(range);
        prop_assert_eq!(TypeInference::new().infer(&column(values)), TypeTag::Range);
    }

    #[test]
    fn inference_never_panics(values in prop::collection::vec(".{0,20}", 0..20)) {
        let _ = TypeInference::new().infer(&column(values));
    }
}

// =============================================================================
// Level Reconciliation Properties
// =============================================================================

proptest! {
    #[test]
    fn undeclared_levels_round_trip(
        observed in prop::collection::vec(level_label(), 0..30),
        sentinels in prop::collection::vec(prop_oneof![Just("n/a"), Just("nan"), Just("NaN")], 0..3),
    ) {
        let distinct: indexmap::IndexSet<String> = observed.iter().map(|v| normalize_level(v)).collect();
        let all = observed.iter().map(String::as_str).chain(sentinels.iter().copied());

        let result = reconcile_levels(all, &IndexMap::new());

        prop_assert!(result.declared.is_empty());
        prop_assert_eq!(result.undeclared.len(), distinct.len());
        for level in &result.undeclared {
            prop_assert!(level.value != "n/a" && level.value != "nan");
        }
    }

    #[test]
    fn reconciling_against_itself_is_a_noop(
        observed in prop::collection::vec(level_label(), 0..30),
    ) {
        let declared: IndexMap<String, String> = observed
            .iter()
            .map(|v| (v.clone(), format!("label for {}", v)))
            .collect();

        let result = reconcile_levels(&observed, &declared);
        prop_assert!(result.is_noop());
        prop_assert!(result.undeclared.is_empty());
    }
}

// =============================================================================
// Merge Properties
// =============================================================================

proptest! {
    #[test]
    fn merge_keeps_uncomputed_fields(existing in json_object(), computed in json_object()) {
        let merged = merge(&existing, &computed);

        let mut paths = Vec::new();
        leaf_paths(&existing, &mut Vec::new(), &mut paths);
        for path in paths {
            // Fields the computed side sets may change; everything else stays.
            let touched = (1..=path.len()).any(|n| {
                lookup(&computed, &path[..n]).is_some_and(|v| n == path.len() || !v.is_object())
            });
            if !touched {
                prop_assert_eq!(lookup(&merged, &path), lookup(&existing, &path));
            }
        }
    }

    #[test]
    fn merge_with_empty_is_identity(existing in json_object()) {
        prop_assert_eq!(merge(&existing, &Value::Object(Map::new())), existing);
    }
}

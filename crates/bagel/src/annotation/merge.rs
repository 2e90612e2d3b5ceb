//! Additive merging of JSON documents.

use serde_json::Value;

/// Merge `computed` into `existing`, returning the merged document.
///
/// Objects are merged key by key, recursively. Any other computed value
/// replaces the existing one. Keys only present in `existing` are kept.
pub fn merge(existing: &Value, computed: &Value) -> Value {
    match (existing, computed) {
        (Value::Object(old), Value::Object(new)) => {
            let mut merged = old.clone();
            for (key, value) in new {
                let value = match old.get(key) {
                    Some(previous) => merge(previous, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (_, computed) => computed.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keeps_unknown_keys() {
        let existing = json!({"Description": "age", "Units": "years", "Annotations": {"Custom": 1}});
        let computed = json!({"Annotations": {"IsAbout": {"TermURL": "nb:Age", "Label": ""}}});

        let merged = merge(&existing, &computed);
        assert_eq!(merged["Units"], "years");
        assert_eq!(merged["Annotations"]["Custom"], 1);
        assert_eq!(merged["Annotations"]["IsAbout"]["TermURL"], "nb:Age");
    }

    #[test]
    fn test_scalars_are_replaced() {
        let merged = merge(&json!({"a": "old"}), &json!({"a": "new"}));
        assert_eq!(merged, json!({"a": "new"}));

        let merged = merge(&json!("text"), &json!({"a": 1}));
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn test_inputs_untouched() {
        let existing = json!({"a": {"b": 1}});
        let computed = json!({"a": {"c": 2}});
        let merged = merge(&existing, &computed);

        assert_eq!(existing, json!({"a": {"b": 1}}));
        assert_eq!(merged, json!({"a": {"b": 1, "c": 2}}));
    }
}

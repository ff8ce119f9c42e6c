//! Lookups over loosely-shaped JSON records

use serde_json::Value;

/// Return the first key from `keys` that is present (and not `null`) in
/// `record`, together with its value.
pub fn first_present<'a>(
    record: &'a Value,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    let object = record.as_object()?;
    keys.iter().find_map(|&key| match object.get(key) {
        Some(Value::Null) | None => None,
        Some(value) => Some((key, value)),
    })
}

/// Render a scalar for display. Numbers and strings only.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_match_wins() {
        let record = json!({ "b": 2, "a": 1 });
        assert_eq!(first_present(&record, &["a", "b"]), Some(("a", &json!(1))));
        assert_eq!(first_present(&record, &["c", "b"]), Some(("b", &json!(2))));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let record = json!({ "a": null, "b": "x" });
        assert_eq!(first_present(&record, &["a", "b"]), Some(("b", &json!("x"))));
    }

    #[test]
    fn test_non_object_yields_none() {
        assert!(first_present(&json!([1, 2]), &["a"]).is_none());
        assert!(first_present(&json!({}), &[]).is_none());
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(&json!(250)).as_deref(), Some("250"));
        assert_eq!(value_as_text(&json!("250")).as_deref(), Some("250"));
        assert!(value_as_text(&json!({ "x": 1 })).is_none());
    }
}

//! Feature sets and truthiness rules
//!
//! A feature set maps a feature name to a strict boolean. Raw input arrives as
//! [`serde_json::Value`] and is normalized with [`is_true`] (or a context's
//! override of it) before it is stored anywhere.

use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized feature set: feature name to enabled state.
pub type Features = BTreeMap<String, bool>;

/// Determine if a raw value is true.
///
/// Only the boolean `true` and the string `"true"` (any case) are true.
///
/// # Examples
///
/// ```
/// use featureswitch_core::is_true;
/// use serde_json::json;
///
/// assert!(is_true(&json!(true)));
/// assert!(is_true(&json!("TRUE")));
/// assert!(!is_true(&json!(1)));
/// ```
pub fn is_true(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Determine if a raw value is false (boolean `false` or the string `"false"`).
pub fn is_false(value: &Value) -> bool {
    match value {
        Value::Bool(b) => !*b,
        Value::String(s) => s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}

/// Determine if a raw value reads as a boolean at all.
pub fn is_boolean(value: &Value) -> bool {
    is_true(value) || is_false(value)
}

/// Check that a raw value has the shape of a feature set (an object).
pub fn is_features(value: &Value) -> bool {
    value.is_object()
}

/// Check that a raw value is a feature set whose values all read as booleans.
pub fn is_features_strict(value: &Value) -> bool {
    value
        .as_object()
        .map(|map| map.values().all(is_boolean))
        .unwrap_or(false)
}

/// Normalize a raw value into a feature set using the default truthiness rule.
///
/// Anything other than an object yields an empty set.
pub fn as_features(value: &Value) -> Features {
    normalize(value, is_true)
}

/// Normalize a raw value into a feature set with a custom truthiness rule.
pub(crate) fn normalize(value: &Value, is_true: impl Fn(&Value) -> bool) -> Features {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(name, raw)| (name.clone(), is_true(raw)))
            .collect(),
        _ => Features::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_true() {
        assert!(is_true(&json!(true)));
        assert!(is_true(&json!("true")));
        assert!(is_true(&json!("True")));
        assert!(!is_true(&json!(false)));
        assert!(!is_true(&json!("yes")));
        assert!(!is_true(&json!(1)));
        assert!(!is_true(&Value::Null));
    }

    #[test]
    fn test_is_false_and_boolean() {
        assert!(is_false(&json!(false)));
        assert!(is_false(&json!("FALSE")));
        assert!(!is_false(&json!(0)));

        assert!(is_boolean(&json!("false")));
        assert!(is_boolean(&json!(true)));
        assert!(!is_boolean(&json!("someString")));
    }

    #[test]
    fn test_is_features() {
        assert!(is_features(&json!({})));
        assert!(is_features(&json!({"one": true, "two": false})));

        for value in [json!(null), json!(true), json!(12345), json!("some string"), json!([])] {
            assert!(!is_features(&value), "{value} is not a feature set");
        }
    }

    #[test]
    fn test_is_features_strict() {
        assert!(is_features_strict(&json!({"one": true, "two": "false"})));
        assert!(!is_features_strict(&json!({"one": true, "two": "someString"})));
        assert!(!is_features_strict(&json!([true])));
    }

    #[test]
    fn test_as_features_rejects_non_objects() {
        for value in [json!(null), json!(123), json!([]), json!("some string")] {
            assert!(as_features(&value).is_empty());
        }
    }

    #[test]
    fn test_as_features_normalizes() {
        let features = as_features(&json!({
            "booleanTrue": true,
            "booleanFalse": false,
            "stringTrue": "true",
            "stringFalse": "false",
            "numberFeature": 123,
            "arrayFeature": [],
            "nullFeature": null
        }));

        assert_eq!(features.get("booleanTrue"), Some(&true));
        assert_eq!(features.get("booleanFalse"), Some(&false));
        assert_eq!(features.get("stringTrue"), Some(&true));
        assert_eq!(features.get("stringFalse"), Some(&false));
        assert_eq!(features.get("numberFeature"), Some(&false));
        assert_eq!(features.get("arrayFeature"), Some(&false));
        assert_eq!(features.get("nullFeature"), Some(&false));
    }
}

//! Raw value coercion
//!
//! Configuration entries and request params arrive as loosely typed JSON.
//! These helpers turn them into the scalars the rest of the crate works with.

use serde_json::Value;

/// Render a scalar JSON value as a string.
///
/// Strings are returned as-is, numbers and booleans are formatted.
/// `null`, arrays and objects yield `None`.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a boolean flag (`1`, `true`, `yes`, `on`, case-insensitive).
///
/// Blank or missing input returns `default`.
pub fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    let s = raw.unwrap_or("").trim().to_ascii_lowercase();
    if s.is_empty() {
        return default;
    }
    matches!(s.as_str(), "1" | "true" | "yes" | "on")
}

/// Same as [`parse_bool`] but for a raw JSON value.
pub fn value_to_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(v) => parse_bool(scalar_to_string(v).as_deref(), default),
        None => default,
    }
}

/// Parse an integer from a JSON number or a numeric string.
pub fn value_to_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Trimmed string form of a value, empty when missing or not a scalar.
pub fn value_to_trimmed(value: Option<&Value>) -> String {
    value
        .and_then(scalar_to_string)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("TRUE"), false));
        assert!(parse_bool(Some(" yes "), false));
        assert!(parse_bool(Some("1"), false));
        assert!(!parse_bool(Some("0"), true));
        assert!(!parse_bool(Some("nope"), true));
        assert!(parse_bool(Some("  "), true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn test_value_to_i64() {
        assert_eq!(value_to_i64(Some(&json!(22))), Some(22));
        assert_eq!(value_to_i64(Some(&json!(" 2222 "))), Some(2222));
        assert_eq!(value_to_i64(Some(&json!("abc"))), None);
        assert_eq!(value_to_i64(Some(&json!(null))), None);
        assert_eq!(value_to_i64(None), None);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_list(" , ").is_empty());
    }
}

//! Pretty-printing of JSON for display.
//!
//! Request bodies and responses are shown with 4-space indentation, the same
//! layout bodies are re-serialised with after replacement.

use crate::body::mutator::to_indented_string;
use serde_json::Value;

/// Pretty-prints a JSON value.
///
/// # Examples
///
/// ```
/// use restcli::formatter::json::format_value;
/// use serde_json::json;
///
/// assert_eq!(format_value(&json!({"a": 1})), "{\n    \"a\": 1\n}");
/// assert_eq!(format_value(&json!("text")), "\"text\"");
/// ```
pub fn format_value(value: &Value) -> String {
    to_indented_string(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty-prints JSON text, returning it unchanged if it is not JSON.
///
/// # Examples
///
/// ```
/// use restcli::formatter::json::format_json_safe;
///
/// assert_eq!(format_json_safe(r#"{"name":"web"}"#), "{\n    \"name\": \"web\"\n}");
/// assert_eq!(format_json_safe("<html/>"), "<html/>");
/// ```
pub fn format_json_safe(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => format_value(&value),
        Err(_) => text.to_string(),
    }
}

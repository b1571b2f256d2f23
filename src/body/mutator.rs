//! Alias resolution and `name=value` body replacement.
//!
//! Replacements are applied in the order given. Each one resolves its name
//! through the resource's alias table, resolves the resulting address, and
//! assigns the coerced value in place. A failing replacement stops the batch;
//! the ones already applied stay applied.

use super::address::write_address;
use super::error::AddressError;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Per-resource mapping of short names to canonical addresses.
pub type AliasTable = HashMap<String, String>;

/// A single `name=value` replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Alias or address of the field to replace
    pub name: String,
    /// Raw value as typed on the command line
    pub value: String,
}

impl Replacement {
    /// Creates a new replacement.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses a `name=value` argument, splitting on the first `=`.
    ///
    /// # Examples
    ///
    /// ```
    /// use restcli::body::mutator::Replacement;
    ///
    /// let r = Replacement::parse("metadata.query=a=b").unwrap();
    /// assert_eq!(r.name, "metadata.query");
    /// assert_eq!(r.value, "a=b");
    /// ```
    pub fn parse(arg: &str) -> Result<Self, AddressError> {
        match arg.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok(Self::new(name, value)),
            _ => Err(AddressError::InvalidReplacement(arg.to_string())),
        }
    }
}

/// Resolves a name through an alias table.
///
/// Returns the mapped address, or the name unchanged when no alias exists.
/// Alias targets are never resolved again.
pub fn resolve_alias<'a>(aliases: Option<&'a AliasTable>, name: &'a str) -> &'a str {
    aliases
        .and_then(|table| table.get(name))
        .map(String::as_str)
        .unwrap_or(name)
}

/// Converts a raw replacement value to JSON.
///
/// Values that lex as an integer, ignoring surrounding whitespace, become
/// JSON numbers; everything else is kept as a string. Integers outside the
/// `i64`/`u64` range stay strings.
pub fn coerce_value(raw: &str) -> JsonValue {
    let trimmed = raw.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return JsonValue::from(number);
    }
    if let Ok(number) = trimmed.parse::<u64>() {
        return JsonValue::from(number);
    }
    JsonValue::String(raw.to_string())
}

/// Applies replacements to a body in place.
///
/// # Arguments
///
/// * `body` - Parsed JSON body, mutated in place
/// * `replacements` - Replacements in application order
/// * `aliases` - Alias table of the matched resource, if any
///
/// # Errors
///
/// Returns the first `AddressError` encountered. Replacements before it
/// remain applied.
pub fn apply_replacements(
    body: &mut JsonValue,
    replacements: &[Replacement],
    aliases: Option<&AliasTable>,
) -> Result<(), AddressError> {
    for replacement in replacements {
        let address = resolve_alias(aliases, &replacement.name);
        if address != replacement.name {
            log::debug!("alias '{}' -> '{}'", replacement.name, address);
        }
        write_address(body, address, coerce_value(&replacement.value))?;
    }
    Ok(())
}

/// Parses a textual body, applies replacements and re-serialises it.
///
/// The result is pretty-printed with 4-space indentation.
pub fn replace_in_text(
    body: &str,
    replacements: &[Replacement],
    aliases: Option<&AliasTable>,
) -> Result<String, AddressError> {
    let mut parsed: JsonValue = serde_json::from_str(body)?;
    apply_replacements(&mut parsed, replacements, aliases)?;
    to_indented_string(&parsed)
}

/// Serialises JSON with 4-space indentation.
pub fn to_indented_string(value: &JsonValue) -> Result<String, AddressError> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| AddressError::NotJson(e.to_string()))
}

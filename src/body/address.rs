//! Structured addressing inside nested JSON bodies.
//!
//! An address is a dotted path with optional bracketed indices:
//!
//! ```text
//! groupConfiguration.name
//! launchConfiguration.args.server.personality[0].path
//! [2].c[3][4]
//! ```
//!
//! Resolution never returns the addressed value itself. It returns the
//! container holding it together with the key that selects it, so the same
//! result serves both reading (`-o`) and writing (`-r name=value`).

use super::error::AddressError;
use serde_json::Value as JsonValue;
use std::fmt;

/// A single navigation step within an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathToken {
    /// Object field access (e.g., `name`)
    Field(String),

    /// Array index access (e.g., `[2]`)
    Index(usize),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathToken::Field(name) => write!(f, "{}", name),
            PathToken::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Parses an address string into navigation tokens.
///
/// # Arguments
///
/// * `address` - Address such as `a.b[2].c` or `[2].c[3][4]`
///
/// # Returns
///
/// The ordered tokens, or `AddressError::Malformed` when the string does not
/// follow the grammar (empty segments, unclosed brackets, non-integer indices).
///
/// # Examples
///
/// ```
/// use restcli::body::address::{parse_address, PathToken};
///
/// let tokens = parse_address("a.b[2].c").unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         PathToken::Field("a".to_string()),
///         PathToken::Field("b".to_string()),
///         PathToken::Index(2),
///         PathToken::Field("c".to_string()),
///     ]
/// );
/// ```
pub fn parse_address(address: &str) -> Result<Vec<PathToken>, AddressError> {
    if address.is_empty() {
        return Err(malformed(address, "address is empty"));
    }

    let mut tokens = Vec::new();
    let mut name = String::new();
    let mut after_dot = false;
    let mut after_index = false;
    let mut chars = address.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if name.is_empty() && !after_index {
                    return Err(malformed(address, "empty segment"));
                }
                if !name.is_empty() {
                    tokens.push(PathToken::Field(std::mem::take(&mut name)));
                }
                after_dot = true;
                after_index = false;
            }
            '[' => {
                if after_dot && name.is_empty() {
                    return Err(malformed(address, "index must follow a field name"));
                }
                if !name.is_empty() {
                    tokens.push(PathToken::Field(std::mem::take(&mut name)));
                }

                let mut index_str = String::new();
                let mut closed = false;
                for next_ch in chars.by_ref() {
                    if next_ch == ']' {
                        closed = true;
                        break;
                    }
                    index_str.push(next_ch);
                }
                if !closed {
                    return Err(malformed(address, "unclosed '['"));
                }

                let index = index_str.trim().parse::<usize>().map_err(|_| {
                    malformed(
                        address,
                        &format!("index '{}' is not a non-negative integer", index_str),
                    )
                })?;
                tokens.push(PathToken::Index(index));
                after_dot = false;
                after_index = true;
            }
            ']' => return Err(malformed(address, "unexpected ']'")),
            other => {
                if after_index {
                    return Err(malformed(address, "expected '.' or '[' after ']'"));
                }
                name.push(other);
                after_dot = false;
            }
        }
    }

    if after_dot && name.is_empty() {
        return Err(malformed(address, "trailing '.'"));
    }
    if !name.is_empty() {
        tokens.push(PathToken::Field(name));
    }

    Ok(tokens)
}

/// Locates the container and key an address points at.
///
/// Walks the body one token at a time. Descent continues while tokens remain
/// and the value reached is itself an object or array; as soon as a scalar
/// is reached, or only the final token is left, the last container reached
/// is returned with the key selecting the terminal value.
///
/// A final field absent from an object is accepted (a write will insert it).
///
/// # Errors
///
/// `AddressError::NotFound` when an intermediate key is absent, an index is
/// out of bounds, or a token is applied to the wrong kind of value.
///
/// # Examples
///
/// ```
/// use restcli::body::address::{extract_address, PathToken};
/// use serde_json::json;
///
/// let body = json!({"a": {"b": [2, 3, {"c": "c2"}]}});
/// let (container, key) = extract_address(&body, "a.b[2]").unwrap();
/// assert_eq!(container, &body["a"]["b"]);
/// assert_eq!(key, PathToken::Index(2));
/// ```
pub fn extract_address<'a>(
    body: &'a JsonValue,
    address: &str,
) -> Result<(&'a JsonValue, PathToken), AddressError> {
    let tokens = parse_address(address)?;
    let (last, intermediate) = tokens
        .split_last()
        .ok_or_else(|| malformed(address, "address is empty"))?;

    let mut current = body;
    for token in intermediate {
        let next = child(current, token).ok_or_else(|| not_found(address, token))?;
        if !is_container(next) {
            return Ok((current, token.clone()));
        }
        current = next;
    }

    check_terminal(current, last, address)?;
    Ok((current, last.clone()))
}

/// Mutable counterpart of [`extract_address`], used for writes.
pub fn extract_address_mut<'a>(
    body: &'a mut JsonValue,
    address: &str,
) -> Result<(&'a mut JsonValue, PathToken), AddressError> {
    let tokens = parse_address(address)?;
    let (last, intermediate) = tokens
        .split_last()
        .ok_or_else(|| malformed(address, "address is empty"))?;

    let mut current = body;
    for token in intermediate {
        let descend = match child(current, token) {
            None => return Err(not_found(address, token)),
            Some(next) => is_container(next),
        };
        if !descend {
            return Ok((current, token.clone()));
        }
        current = child_mut(current, token).ok_or_else(|| not_found(address, token))?;
    }

    check_terminal(current, last, address)?;
    Ok((current, last.clone()))
}

/// Reads the value an address points at.
///
/// # Examples
///
/// ```
/// use restcli::body::address::read_address;
/// use serde_json::json;
///
/// let body = json!({"server": {"name": "webhead"}});
/// assert_eq!(read_address(&body, "server.name").unwrap(), "webhead");
/// ```
pub fn read_address<'a>(body: &'a JsonValue, address: &str) -> Result<&'a JsonValue, AddressError> {
    let (container, key) = extract_address(body, address)?;
    child(container, &key).ok_or_else(|| not_found(address, &key))
}

/// Writes `value` at the location an address points at.
///
/// Existing values are replaced; a missing final object field is inserted.
pub fn write_address(
    body: &mut JsonValue,
    address: &str,
    value: JsonValue,
) -> Result<(), AddressError> {
    let (container, key) = extract_address_mut(body, address)?;
    match (container, &key) {
        (JsonValue::Object(map), PathToken::Field(name)) => {
            map.insert(name.clone(), value);
            Ok(())
        }
        (JsonValue::Array(items), PathToken::Index(index)) => match items.get_mut(*index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(not_found(address, &key)),
        },
        _ => Err(not_found(address, &key)),
    }
}

fn child<'a>(value: &'a JsonValue, token: &PathToken) -> Option<&'a JsonValue> {
    match (value, token) {
        (JsonValue::Object(map), PathToken::Field(name)) => map.get(name),
        (JsonValue::Array(items), PathToken::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut JsonValue, token: &PathToken) -> Option<&'a mut JsonValue> {
    match (value, token) {
        (JsonValue::Object(map), PathToken::Field(name)) => map.get_mut(name),
        (JsonValue::Array(items), PathToken::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

fn is_container(value: &JsonValue) -> bool {
    matches!(value, JsonValue::Object(_) | JsonValue::Array(_))
}

// The final key may be absent from an object, never out of an array's bounds.
fn check_terminal(
    container: &JsonValue,
    token: &PathToken,
    address: &str,
) -> Result<(), AddressError> {
    match (container, token) {
        (JsonValue::Object(_), PathToken::Field(_)) => Ok(()),
        (JsonValue::Array(items), PathToken::Index(index)) if *index < items.len() => Ok(()),
        _ => Err(not_found(address, token)),
    }
}

fn malformed(address: &str, reason: &str) -> AddressError {
    AddressError::Malformed {
        address: address.to_string(),
        reason: reason.to_string(),
    }
}

fn not_found(address: &str, token: &PathToken) -> AddressError {
    AddressError::NotFound {
        address: address.to_string(),
        segment: token.to_string(),
    }
}

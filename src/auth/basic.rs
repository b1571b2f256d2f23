//! HTTP Basic credentials (RFC 7617).

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Encodes username and password into a Basic authentication header value.
///
/// # Examples
///
/// ```
/// use restcli::auth::basic::basic_auth;
///
/// let auth_header = basic_auth("user", "pass123");
/// assert_eq!(auth_header, "Basic dXNlcjpwYXNzMTIz");
/// ```
pub fn basic_auth(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    let encoded = STANDARD.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}

/// Builds a Basic header value from a `user:password` argument.
///
/// The argument is split on the first colon, so passwords may contain
/// colons. Returns `None` when there is no colon at all.
pub fn basic_auth_from_arg(arg: &str) -> Option<String> {
    let (username, password) = arg.split_once(':')?;
    Some(basic_auth(username, password))
}

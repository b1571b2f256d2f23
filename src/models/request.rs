//! HTTP request data models.

use std::collections::BTreeMap;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
        }
    }

    /// Parses a method name, case-insensitively.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully assembled request, ready to be printed or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,

    /// Absolute URI the request goes to.
    pub uri: String,

    /// Resource as recorded in history: the relative path typed by the user,
    /// or the absolute URI when one was given.
    pub resource: String,

    pub headers: BTreeMap<String, String>,

    pub body: Option<String>,
}

impl PreparedRequest {
    /// Sets a header, replacing any existing header with the same name
    /// regardless of case.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Renders the request as printed by `--print` / `--print-only`.
    pub fn display(&self) -> String {
        match &self.body {
            Some(body) => format!("{} {}\n{}", self.method, self.uri, body),
            None => format!("{} {}", self.method, self.uri),
        }
    }
}

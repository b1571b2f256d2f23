//! Data models for request history.

use std::fmt;

/// A single request recorded in a history log.
///
/// On disk an entry is three parts: the method line, the resource line, and
/// an optional body spanning the remaining lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// HTTP method as sent, e.g. `POST`.
    pub method: String,

    /// Relative resource path or absolute URI.
    pub resource: String,

    /// Serialized request body, if any.
    pub body: Option<String>,

    /// Recency index: 1 is the most recent entry.
    ///
    /// Assigned when the entry is read; never stored.
    pub index: Option<usize>,
}

impl HistoryEntry {
    /// Creates an entry that has not been read from a log.
    ///
    /// An empty body is normalized to `None`.
    pub fn new(
        method: impl Into<String>,
        resource: impl Into<String>,
        body: Option<String>,
    ) -> Self {
        Self {
            method: method.into(),
            resource: resource.into(),
            body: body.filter(|b| !b.is_empty()),
            index: None,
        }
    }

    /// Whether both entries describe the same request.
    ///
    /// The recency index is ignored.
    pub fn same_request(&self, other: &HistoryEntry) -> bool {
        self.method == other.method && self.resource == other.resource && self.body == other.body
    }

    /// Whether the method and resource each fit on a single line.
    ///
    /// The on-disk form cannot represent a line break in either field.
    pub fn is_storable(&self) -> bool {
        !self.method.contains(['\n', '\r']) && !self.resource.contains(['\n', '\r'])
    }

    /// Renders the entry in its on-disk text form.
    pub fn to_file_contents(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n{}\n{}\n", self.method, self.resource, body),
            None => format!("{}\n{}\n", self.method, self.resource),
        }
    }

    /// Parses the on-disk text form.
    ///
    /// Returns `None` when the method or resource line is missing. When
    /// `include_body` is false the body is not retained.
    pub fn from_file_contents(contents: &str, include_body: bool) -> Option<Self> {
        let (method, rest) = contents.split_once('\n')?;
        let (resource, body) = match rest.split_once('\n') {
            Some((resource, body)) => (resource, body),
            None => (rest, ""),
        };

        let method = method.trim();
        let resource = resource.trim();
        if method.is_empty() || resource.is_empty() {
            return None;
        }

        let body = if include_body {
            let body = body.strip_suffix('\n').unwrap_or(body);
            Some(body.to_string())
        } else {
            None
        };

        Some(Self::new(method, resource, body))
    }
}

/// Errors that can occur during history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// No readable entry exists at the requested recency index.
    NotFound {
        /// Requested recency index (1 = most recent)
        index: usize,
    },

    /// Error occurred during storage operations (file I/O).
    StorageError(std::io::Error),

    /// An entry file exists but cannot be parsed.
    Corrupt {
        /// Physical sequence number of the entry
        sequence: u64,
    },

    /// A request cannot be recorded in the one-field-per-line format.
    InvalidEntry(String),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::NotFound { index } => {
                write!(f, "No request found at history index {}", index)
            }
            HistoryError::StorageError(err) => write!(f, "History storage error: {}", err),
            HistoryError::Corrupt { sequence } => {
                write!(f, "History entry {:05} is corrupt", sequence)
            }
            HistoryError::InvalidEntry(msg) => write!(f, "Invalid history entry: {}", msg),
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::StorageError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::StorageError(err)
    }
}

//! HTTP request execution error types.

use std::fmt;

/// Errors that can occur while sending a request.
#[derive(Debug)]
pub enum RequestError {
    /// Connection failure, DNS resolution error or other transport issue.
    NetworkError(String),

    /// Request took longer than the service timeout.
    Timeout,

    /// The assembled URI could not be parsed.
    InvalidUrl(String),

    /// The request could not be constructed (bad header name or value).
    BuildError(String),

    /// The server answered with a non-success status.
    ResponseError {
        /// HTTP status code
        status: u16,
        /// Response body, pretty-printed when it is JSON
        body: String,
    },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RequestError::Timeout => write!(f, "Request timed out"),
            RequestError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            RequestError::BuildError(msg) => write!(f, "Request build error: {}", msg),
            RequestError::ResponseError { status, body } => {
                if body.is_empty() {
                    write!(f, "Request failed with status {}", status)
                } else {
                    write!(f, "Request failed with status {}\n{}", status, body)
                }
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::BuildError(err.to_string())
        } else {
            RequestError::NetworkError(err.to_string())
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}

//! Error types for body addressing and mutation.

use std::fmt;

/// Errors that can occur while addressing or mutating a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address string does not follow the `a.b[0].c` grammar.
    Malformed {
        /// The address as given
        address: String,
        /// What was wrong with it
        reason: String,
    },

    /// A segment of the address does not exist in the body.
    ///
    /// Raised for an absent map key, an index past the end of a sequence,
    /// or a field/index applied to the wrong kind of container.
    NotFound {
        /// The address being resolved
        address: String,
        /// The segment that could not be followed
        segment: String,
    },

    /// A replacement argument is not in `name=value` form.
    InvalidReplacement(String),

    /// The body to mutate is not valid JSON.
    NotJson(String),
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressError::Malformed { address, reason } => {
                write!(f, "Malformed address '{}': {}", address, reason)
            }
            AddressError::NotFound { address, segment } => {
                write!(
                    f,
                    "Address '{}' not found in body (failed at '{}')",
                    address, segment
                )
            }
            AddressError::InvalidReplacement(arg) => write!(
                f,
                "Invalid replacement '{}'. Expected format: 'name=value'",
                arg
            ),
            AddressError::NotJson(msg) => write!(f, "Body is not valid JSON: {}", msg),
        }
    }
}

impl std::error::Error for AddressError {}

impl From<serde_json::Error> for AddressError {
    fn from(err: serde_json::Error) -> Self {
        AddressError::NotJson(err.to_string())
    }
}

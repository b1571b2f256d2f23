//! Service configuration loading and validation.
//!
//! A service document is read once per invocation, validated, and compiled
//! into an immutable [`ServiceConfig`]. Environment lookups are not done here;
//! see [`resolve`] for the one-shot resolution of headers and URI prefix.

pub mod resolve;
pub mod schema;

pub use resolve::{resolve_service, ResolvedService};
pub use schema::{HeaderSpec, ServiceDocument, UriPrefixSpec};

use crate::resources::{ResourceCatalog, ResourceDefinition};
use crate::services::GENERIC_HISTORY_DIR;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Errors that can occur while loading a service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration file does not exist.
    NotFound(String),

    /// IO error occurred while reading the file.
    Io(String),

    /// The document is not valid JSON or does not match the schema.
    Parse(String),

    /// A resource or URI prefix pattern is not a valid regex.
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Regex compiler message
        reason: String,
    },

    /// The document is well-formed but semantically invalid.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Service configuration not found: {}", path),
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse service configuration: {}", msg),
            ConfigError::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid pattern '{}': {}", pattern, reason)
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid service configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Compiled URI prefix declaration.
#[derive(Debug, Clone)]
pub enum UriPrefix {
    /// Fixed prefix.
    Literal(String),

    /// Prefix read from `var`, expected to contain a match for `expect`.
    FromEnv {
        var: String,
        expect: Option<Regex>,
    },
}

/// An immutable, validated service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub name: String,
    pub description: String,
    pub uri_prefix: Option<UriPrefix>,
    pub headers: BTreeMap<String, HeaderSpec>,
    /// Request timeout in milliseconds.
    pub timeout: u64,
    pub resources: ResourceCatalog,
}

impl ServiceConfig {
    /// Validates and compiles a deserialized document.
    ///
    /// # Errors
    ///
    /// - `ConfigError::Invalid` for an empty name, a name that is not a plain
    ///   directory name (including the reserved generic history directory),
    ///   a zero timeout, or a malformed resource entry
    /// - `ConfigError::InvalidPattern` for a pattern that does not compile
    pub fn from_document(doc: ServiceDocument) -> Result<Self, ConfigError> {
        if doc.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if doc.name.contains(['/', '\\'])
            || doc.name == "."
            || doc.name == ".."
            || doc.name == GENERIC_HISTORY_DIR
        {
            return Err(ConfigError::Invalid(format!(
                "name '{}' must be a plain directory name",
                doc.name
            )));
        }
        if doc.timeout == 0 {
            return Err(ConfigError::Invalid("timeout must be greater than 0".to_string()));
        }

        let uri_prefix = match doc.uriprefix {
            None => None,
            Some(UriPrefixSpec::Literal(prefix)) => Some(UriPrefix::Literal(prefix)),
            Some(UriPrefixSpec::FromEnv { regex, env }) => {
                let expect = regex.map(|pattern| compile_pattern(&pattern)).transpose()?;
                Some(UriPrefix::FromEnv { var: env, expect })
            }
        };

        let mut resources = ResourceCatalog::new();
        for (pattern, raw) in doc.resources {
            let definition: ResourceDefinition = serde_json::from_value(raw).map_err(|e| {
                ConfigError::Invalid(format!("resource '{}': {}", pattern, e))
            })?;
            resources
                .push(&pattern, definition)
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            name: doc.name,
            description: doc.description,
            uri_prefix,
            headers: doc.headers,
            timeout: doc.timeout,
            resources,
        })
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }
}

/// Parses a service document from JSON text.
pub fn parse_service_config(text: &str) -> Result<ServiceConfig, ConfigError> {
    let doc: ServiceDocument = serde_json::from_str(text)?;
    ServiceConfig::from_document(doc)
}

/// Loads a service document from a file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, otherwise any
/// read, parse or validation error.
pub fn load_service_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound(path.display().to_string())
        } else {
            ConfigError::from(e)
        }
    })?;
    parse_service_config(&content)
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

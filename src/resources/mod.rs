//! Resource matching and template lookup.
//!
//! A service declares its resources as an ordered list of regex patterns.
//! A requested path is matched against them in declaration order with a
//! case-insensitive search; the first pattern that matches anywhere in the
//! path owns the request, even when a later pattern would match more
//! specifically.

use crate::body::AliasTable;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

/// Template name used when the caller does not pick one.
pub const DEFAULT_TEMPLATE: &str = "default";

/// Errors from resource lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// No declared pattern matches the requested path.
    NotMatched {
        /// The requested resource path
        path: String,
    },

    /// The matched resource has no template with the requested name.
    TemplateNotFound {
        /// Requested template name
        name: String,
        /// The requested resource path
        path: String,
    },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotMatched { path } => {
                write!(f, "No resource definition matches '{}'", path)
            }
            ResourceError::TemplateNotFound { name, path } => {
                write!(f, "Template '{}' not found for resource '{}'", name, path)
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// Declared configuration of one resource pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    /// Named starter bodies, conventionally including `default`.
    #[serde(default)]
    pub templates: BTreeMap<String, JsonValue>,

    /// Short names mapped to canonical body addresses.
    #[serde(default)]
    pub aliases: AliasTable,

    /// Human-readable description shown by `--resources`.
    #[serde(default)]
    pub help: Option<String>,
}

impl ResourceDefinition {
    /// Returns the template stored under `name`, or under `default` when no
    /// name is given.
    pub fn template(&self, name: Option<&str>) -> Option<&JsonValue> {
        self.templates.get(name.unwrap_or(DEFAULT_TEMPLATE))
    }

    /// Template names in sorted order.
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }

    /// The alias table, or `None` when the resource declares no aliases.
    pub fn aliases(&self) -> Option<&AliasTable> {
        if self.aliases.is_empty() {
            None
        } else {
            Some(&self.aliases)
        }
    }
}

/// A compiled resource pattern with its definition.
#[derive(Debug, Clone)]
pub struct ResourcePattern {
    pattern: String,
    regex: Regex,
    definition: ResourceDefinition,
}

impl ResourcePattern {
    /// Compiles `pattern` as a case-insensitive regex.
    pub fn compile(pattern: &str, definition: ResourceDefinition) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            definition,
        })
    }

    /// The pattern as written in the service document.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.definition
    }

    /// Whether the pattern is found anywhere in `path`.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Ordered catalog of a service's resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: Vec<ResourcePattern>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resource; declaration order is match order.
    pub fn push(
        &mut self,
        pattern: &str,
        definition: ResourceDefinition,
    ) -> Result<(), regex::Error> {
        self.resources.push(ResourcePattern::compile(pattern, definition)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourcePattern> {
        self.resources.iter()
    }

    /// Finds the definition of the first pattern matching `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use restcli::resources::{ResourceCatalog, ResourceDefinition};
    ///
    /// let mut catalog = ResourceCatalog::new();
    /// catalog.push("servers/?$", ResourceDefinition::default()).unwrap();
    /// assert!(catalog.match_resource("Servers").is_some());
    /// assert!(catalog.match_resource("images").is_none());
    /// ```
    pub fn match_resource(&self, path: &str) -> Option<&ResourceDefinition> {
        let found = self.resources.iter().find(|resource| resource.is_match(path));
        match found {
            Some(resource) => {
                log::debug!("resource '{}' matched pattern '{}'", path, resource.pattern);
                Some(&resource.definition)
            }
            None => {
                log::debug!("resource '{}' matched no declared pattern", path);
                None
            }
        }
    }

    /// Like [`match_resource`](Self::match_resource) but fails with
    /// `ResourceError::NotMatched`.
    pub fn require(&self, path: &str) -> Result<&ResourceDefinition, ResourceError> {
        self.match_resource(path)
            .ok_or_else(|| ResourceError::NotMatched {
                path: path.to_string(),
            })
    }

    /// Looks up a template for the resource owning `path`.
    pub fn template(&self, path: &str, name: Option<&str>) -> Result<&JsonValue, ResourceError> {
        self.require(path)?
            .template(name)
            .ok_or_else(|| ResourceError::TemplateNotFound {
                name: name.unwrap_or(DEFAULT_TEMPLATE).to_string(),
                path: path.to_string(),
            })
    }

    /// Help text of every resource in declaration order; resources without
    /// help are listed by their pattern.
    pub fn help_lines(&self) -> Vec<String> {
        self.resources
            .iter()
            .map(|resource| {
                resource
                    .definition
                    .help
                    .clone()
                    .unwrap_or_else(|| resource.pattern.clone())
            })
            .collect()
    }
}

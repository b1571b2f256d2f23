//! One-shot resolution of environment-dependent configuration.
//!
//! Headers declared as `{"env": VAR}` and URI prefixes declared as
//! `{"regex": ..., "env": VAR}` are resolved exactly once, at startup,
//! through an injected lookup. The resolved values are then handed to the
//! rest of the pipeline; nothing downstream reads the environment.

use super::{HeaderSpec, ServiceConfig, UriPrefix};
use std::collections::BTreeMap;

/// Environment-resolved values of a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedService {
    /// URI prefix for relative resources, if one could be determined.
    pub uri_prefix: Option<String>,

    /// Headers with every environment reference substituted.
    ///
    /// Headers whose variable is unset are omitted.
    pub headers: BTreeMap<String, String>,
}

/// Resolves a service's headers and URI prefix.
///
/// # Arguments
///
/// * `config` - The loaded service configuration
/// * `lookup` - Environment lookup, typically `|name| std::env::var(name).ok()`
///
/// # Examples
///
/// ```
/// use restcli::config::{parse_service_config, resolve_service};
///
/// let config = parse_service_config(
///     r#"{"name": "svc", "uriprefix": {"env": "SVC_PREFIX"},
///         "headers": {"X-Auth-Token": {"env": "SVC_TOKEN"}, "Accept": "application/json"}}"#,
/// ).unwrap();
///
/// let resolved = resolve_service(&config, |name| match name {
///     "SVC_PREFIX" => Some("http://localhost/v1/".to_string()),
///     _ => None,
/// });
/// assert_eq!(resolved.uri_prefix.as_deref(), Some("http://localhost/v1/"));
/// assert_eq!(resolved.headers.len(), 1);
/// ```
pub fn resolve_service<F>(config: &ServiceConfig, lookup: F) -> ResolvedService
where
    F: Fn(&str) -> Option<String>,
{
    let uri_prefix = match &config.uri_prefix {
        None => None,
        Some(UriPrefix::Literal(prefix)) => Some(prefix.clone()),
        Some(UriPrefix::FromEnv { var, expect }) => match lookup(var) {
            Some(prefix) => {
                if let Some(expect) = expect {
                    if !expect.is_match(&prefix) {
                        log::warn!(
                            "URI prefix from {} ('{}') does not match expected pattern '{}'",
                            var,
                            prefix,
                            expect.as_str()
                        );
                    }
                }
                Some(prefix)
            }
            None => {
                log::warn!("URI prefix variable {} is not set", var);
                None
            }
        },
    };

    let mut headers = BTreeMap::new();
    for (name, spec) in &config.headers {
        match spec {
            HeaderSpec::Literal(value) => {
                headers.insert(name.clone(), value.clone());
            }
            HeaderSpec::FromEnv { env } => match lookup(env).filter(|v| !v.is_empty()) {
                Some(value) => {
                    headers.insert(name.clone(), value);
                }
                None => log::warn!("Header '{}' skipped: {} is not set", name, env),
            },
        }
    }

    ResolvedService {
        uri_prefix,
        headers,
    }
}

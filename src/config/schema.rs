//! On-disk schema of a service document.
//!
//! A service is described by a JSON document such as:
//!
//! ```json
//! {
//!   "name": "nova",
//!   "description": "Cloud servers",
//!   "uriprefix": { "regex": "/v1.0/\\d+/", "env": "NOVA_URI_PREFIX" },
//!   "headers": {
//!     "X-Auth-Token": { "env": "RS_AUTH_TOKEN" },
//!     "Content-Type": "application/json"
//!   },
//!   "resources": {
//!     "servers/?$": {
//!       "templates": { "default": { "server": { "name": "webhead" } } },
//!       "aliases": { "name": "server.name" },
//!       "help": "Servers"
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// Raw service document as deserialized from `config.json`.
///
/// `resources` is kept as a JSON object so its declaration order survives
/// deserialization; it is compiled into a
/// [`ResourceCatalog`](crate::resources::ResourceCatalog) on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDocument {
    /// Service name, also its directory name under the restcli home.
    pub name: String,

    /// One-line description shown by `--list-services`.
    #[serde(default)]
    pub description: String,

    /// Where the URI prefix for relative resources comes from.
    #[serde(default)]
    pub uriprefix: Option<UriPrefixSpec>,

    /// Headers sent with every request to this service.
    #[serde(default)]
    pub headers: BTreeMap<String, HeaderSpec>,

    /// Request timeout in milliseconds. Defaults to 30000ms.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Resource pattern to definition, in declaration order.
    #[serde(default)]
    pub resources: Map<String, JsonValue>,
}

/// URI prefix declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UriPrefixSpec {
    /// Fixed prefix, e.g. `"https://api.example.com/v1/"`.
    Literal(String),

    /// Prefix read from an environment variable.
    FromEnv {
        /// Pattern the resolved prefix is expected to contain.
        #[serde(default)]
        regex: Option<String>,
        /// Environment variable holding the prefix.
        env: String,
    },
}

/// Header value declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderSpec {
    /// Fixed header value.
    Literal(String),

    /// Header value read from an environment variable.
    FromEnv {
        /// Environment variable holding the value.
        env: String,
    },
}

fn default_timeout() -> u64 {
    30000
}

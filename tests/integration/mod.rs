//! Shared fixtures for restcli integration tests.

pub mod end_to_end_test;
pub mod history_log_test;
pub mod resource_catalog_test;

use restcli::services::Home;
use std::collections::HashMap;
use std::fs;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// The autoscale service document used across tests.
///
/// The URI prefix and auth token are read from `AS_URI_PREFIX` and
/// `RS_AUTH_TOKEN`.
pub const AUTOSCALE: &str = r#"{
    "name": "autoscale",
    "description": "Rackspace Auto Scale",
    "uriprefix": {"regex": "/v1\\.0/\\d+/", "env": "AS_URI_PREFIX"},
    "headers": {
        "X-Auth-Token": {"env": "RS_AUTH_TOKEN"},
        "Content-Type": "application/json"
    },
    "timeout": 5000,
    "resources": {
        "groups/?$": {
            "templates": {
                "default": {
                    "groupConfiguration": {
                        "name": "manitest",
                        "cooldown": 60,
                        "minEntities": 0
                    },
                    "launchConfiguration": {
                        "type": "launch_server",
                        "args": {"server": {"name": "web", "flavorRef": "2"}}
                    },
                    "scalingPolicies": [
                        {"name": "Scale up", "change": 1, "cooldown": 10}
                    ]
                }
            },
            "aliases": {
                "name": "groupConfiguration.name",
                "min": "groupConfiguration.minEntities",
                "server": "launchConfiguration.args.server.name"
            },
            "help": "Scaling groups"
        },
        "groups/[\\w\\-]+/config/?$": {
            "aliases": {"name": "name", "min": "minEntities"},
            "help": "Configuration of one scaling group"
        },
        "groups/[\\w\\-]+/?$": {
            "help": "One scaling group"
        }
    }
}"#;

/// Installs [`AUTOSCALE`] into a fresh home directory.
pub fn install_autoscale() -> (TempDir, Home) {
    init_test_env();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let home = Home::new(temp_dir.path().join("home"));
    let doc = temp_dir.path().join("autoscale.json");
    fs::write(&doc, AUTOSCALE).expect("Failed to write service document");
    home.install(&doc).expect("Failed to install service");
    (temp_dir, home)
}

/// Environment lookup backed by a fixed map.
pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

//! Installed services and the restcli home directory.
//!
//! Layout:
//!
//! ```text
//! ~/.restcli/
//!   nova/
//!     config.json
//!     history/
//!   lbaas/
//!     config.json
//!     history/
//!   generic_history/     requests sent without --service
//! ```

use crate::config::{load_service_config, ConfigError, ServiceConfig};
use crate::history::{History, HistoryError};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory holding history of requests sent without a service.
pub const GENERIC_HISTORY_DIR: &str = "generic_history";

/// Service document file name inside a service directory.
pub const CONFIG_FILE: &str = "config.json";

/// History directory name inside a service directory.
pub const HISTORY_DIR: &str = "history";

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "RESTCLI_HOME";

/// Errors from service management.
#[derive(Debug)]
pub enum ServiceError {
    /// The service configuration is missing or invalid.
    Config(ConfigError),

    /// The service history cannot be opened.
    History(HistoryError),

    /// Filesystem error while installing or listing services.
    Io(io::Error),

    /// No home directory could be determined.
    NoHome,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(err) => write!(f, "{}", err),
            ServiceError::History(err) => write!(f, "{}", err),
            ServiceError::Io(err) => write!(f, "IO error: {}", err),
            ServiceError::NoHome => write!(
                f,
                "Could not determine home directory (set {} or HOME)",
                HOME_ENV
            ),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServiceError::Config(err) => Some(err),
            ServiceError::History(err) => Some(err),
            ServiceError::Io(err) => Some(err),
            ServiceError::NoHome => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        ServiceError::Config(err)
    }
}

impl From<HistoryError> for ServiceError {
    fn from(err: HistoryError) -> Self {
        ServiceError::History(err)
    }
}

impl From<io::Error> for ServiceError {
    fn from(err: io::Error) -> Self {
        ServiceError::Io(err)
    }
}

/// A loaded service: its directory, configuration and history log.
#[derive(Debug)]
pub struct Service {
    pub dir: PathBuf,
    pub config: ServiceConfig,
    pub history: History,
}

/// The restcli home directory.
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
}

impl Home {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Determines the home directory from the environment.
    ///
    /// Uses `$RESTCLI_HOME` if set, else `$HOME/.restcli`, else
    /// `%USERPROFILE%/.restcli`.
    pub fn from_env<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(root));
        }
        lookup("HOME")
            .or_else(|| lookup("USERPROFILE"))
            .filter(|v| !v.is_empty())
            .map(|home| Self::new(PathBuf::from(home).join(".restcli")))
            .ok_or(ServiceError::NoHome)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn service_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Opens the history shared by requests sent without a service.
    pub fn generic_history(&self) -> Result<History, ServiceError> {
        Ok(History::open(self.root.join(GENERIC_HISTORY_DIR))?)
    }

    /// Loads an installed service.
    pub fn open_service(&self, name: &str) -> Result<Service, ServiceError> {
        let dir = self.service_dir(name);
        let config = load_service_config(&dir.join(CONFIG_FILE))?;
        let history = History::open(dir.join(HISTORY_DIR))?;
        Ok(Service {
            dir,
            config,
            history,
        })
    }

    /// Installs the service described by the document at `config_path`.
    ///
    /// The document is validated first. Re-installing a service replaces its
    /// configuration and keeps its history.
    pub fn install(&self, config_path: &Path) -> Result<ServiceConfig, ServiceError> {
        let config = load_service_config(config_path)?;
        let dir = self.service_dir(&config.name);
        fs::create_dir_all(dir.join(HISTORY_DIR))?;
        fs::copy(config_path, dir.join(CONFIG_FILE))?;
        log::debug!("installed service '{}' at {}", config.name, dir.display());
        Ok(config)
    }

    /// Lists installed services as `(name, description)`, sorted by name.
    ///
    /// Directories without a readable configuration are skipped.
    pub fn list(&self) -> Result<Vec<(String, String)>, ServiceError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut services = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let dir_entry = dir_entry?;
            if !dir_entry.file_type()?.is_dir() || dir_entry.file_name() == GENERIC_HISTORY_DIR {
                continue;
            }
            let config_path = dir_entry.path().join(CONFIG_FILE);
            match load_service_config(&config_path) {
                Ok(config) => services.push((config.name, config.description)),
                Err(e) => log::warn!("skipping {}: {}", dir_entry.path().display(), e),
            }
        }

        services.sort();
        Ok(services)
    }
}

/// Formats a service listing line: name padded to 15 columns, then description.
pub fn format_service_line(name: &str, description: &str) -> String {
    format!("{:<15}{}", name, description)
}

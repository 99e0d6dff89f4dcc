//! Application settings and paths.
//!
//! Settings are an optional JSON file that supplies defaults for the scan
//! arguments. Command-line flags always win over the file.

use crate::error::{ConfigError, ConfigResult};
use crate::scanner::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use crate::types::PortRange;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/skiff)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the user's directories, if the platform has a home directory.
    pub fn discover() -> Option<Self> {
        let project = ProjectDirs::from("com", "skiff", "skiff")?;
        Some(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Scan defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port specification used when `--port` is not given.
    pub default_ports: String,
    /// Connection wait in seconds used when `--wait` is not given.
    pub default_wait_secs: f64,
    /// Worker pool size used when `--concurrency` is not given.
    pub default_concurrency: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: PortRange::full().to_string(),
            default_wait_secs: DEFAULT_TIMEOUT.as_secs_f64(),
            default_concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl AppSettings {
    /// Load settings.
    ///
    /// An explicit `path` must exist. Without one, the XDG settings file is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match Paths::discover().map(|paths| paths.settings_file()) {
            Some(file) if file.exists() => Self::load_from(&file),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;

        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Reject values the scanner cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        PortRange::parse(&self.default_ports).map_err(|e| ConfigError::InvalidValue {
            name: "default_ports",
            reason: e.to_string(),
        })?;

        if !(self.default_wait_secs.is_finite() && self.default_wait_secs > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: "default_wait_secs",
                reason: format!("{} is not a positive number", self.default_wait_secs),
            });
        }

        if self.default_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                name: "default_concurrency",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

//! Configuration loading and storage path management.
//!
//! [`PanelConfig`] holds the breakpoints and storage key names. Hosts normally
//! use the compiled-in defaults; [`load_config`] reads an optional TOML override.
//! [`StorageConfig`] centralises file paths for file-backed hosts and is
//! injectable for tests via [`StorageConfig::with_root`].

use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::error::{PanelError, Result};
use crate::persistence::{LEGACY_COOKIE_KEY, USER_INTENT_KEY};
use crate::viewport::Breakpoints;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub breakpoints: Breakpoints,
    /// Session-storage key for the user's intent.
    pub intent_key: String,
    /// Cookie name of the legacy representation.
    pub legacy_cookie: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::default(),
            intent_key: USER_INTENT_KEY.to_string(),
            legacy_cookie: LEGACY_COOKIE_KEY.to_string(),
        }
    }
}

/// Loads configuration from `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> Result<PanelConfig> {
    if !path.exists() {
        return Ok(PanelConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|source| PanelError::Io {
        context: format!("reading config {}", path.display()),
        source,
    })?;

    toml::from_str::<PanelConfig>(&content).map_err(|err| PanelError::ConfigMalformed {
        path: path.to_path_buf(),
        details: err.to_string(),
    })
}

/// File locations for file-backed hosts (default root: `~/.panel-nav`).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let root = dirs::home_dir()
            .map(|home| home.join(".panel-nav"))
            .unwrap_or_else(|| std::env::temp_dir().join("panel-nav"));
        Self { root }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to session.json (session-scoped key-value entries).
    pub fn session_file(&self) -> PathBuf {
        self.root.join("session.json")
    }

    /// Path to the cookie header file holding legacy cookies.
    pub fn cookie_file(&self) -> PathBuf {
        self.root.join("cookies.txt")
    }

    /// Path to config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }
}

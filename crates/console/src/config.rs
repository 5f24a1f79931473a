//! Console configuration loaded from `config.toml`.
//!
//! ```toml
//! [server]
//! url = "https://church.example.org/api"
//! timeout_secs = 30
//!
//! [ui]
//! format = "table"   # table, json, csv
//! spinner = true
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use services::services::export::ExportFormat;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server: ServerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub format: ExportFormat,
    pub spinner: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Table,
            spinner: true,
        }
    }
}

impl ConsoleConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Flag or environment value first, then the file, then the built-in default
    pub fn server_url(&self, override_url: Option<&str>) -> String {
        override_url
            .or(self.server.url.as_deref())
            .unwrap_or(DEFAULT_SERVER_URL)
            .to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs.max(1))
    }
}

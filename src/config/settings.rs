//! managesw settings and configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::paths;

/// How the tool server talks to its client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// Newline-delimited JSON-RPC on a Unix socket, one session per connection
    Socket,
    /// One JSON-RPC message per HTTP POST
    Http,
}

/// managesw configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Alternate filesystem root passed to every package tool
    pub root: Option<PathBuf>,

    pub transport: Transport,

    /// Socket path used with the socket transport
    pub socket_path: PathBuf,

    /// Listen address used with the HTTP transport
    pub http_addr: String,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Line limit for query modes when the caller gives none (0 = unlimited)
    pub default_query_lines: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: None,
            transport: Transport::default(),
            socket_path: paths::socket_path(),
            http_addr: "127.0.0.1:8080".to_string(),
            log_level: "info".to_string(),
            default_query_lines: 0,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the config file path
    #[must_use]
    pub fn config_path() -> PathBuf {
        paths::config_file()
    }
}

//! Configuration management for poddle
//!
//! Config is stored at ~/.config/poddle/config.toml. Every field is
//! optional; `PODDLE_SEARCH_URL` and `PODDLE_PROXY_URL` override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::itunes::DEFAULT_SEARCH_URL;

pub const SEARCH_URL_ENV: &str = "PODDLE_SEARCH_URL";
pub const PROXY_URL_ENV: &str = "PODDLE_PROXY_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Podcast search service base URL
    pub search_url: Option<String>,
    /// Feed proxy exposing /get and /convert; feeds are fetched directly when unset
    pub proxy_url: Option<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Log filter used when RUST_LOG is unset (e.g. "info", "poddle=debug")
    pub log_level: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/poddle/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("poddle").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Result<Self> {
        let config = match Self::path() {
            Some(p) => Self::load_from(&p)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Load config from `path`. A missing file yields defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load from an explicit path when given, else from the default location
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Ok(Self::load_from(p)?.with_env_overrides()),
            None => Self::load(),
        }
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Apply `PODDLE_SEARCH_URL` and `PODDLE_PROXY_URL`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(
            std::env::var(SEARCH_URL_ENV).ok(),
            std::env::var(PROXY_URL_ENV).ok(),
        )
    }

    /// Apply environment-style overrides; empty values are ignored
    pub fn with_overrides(mut self, search_url: Option<String>, proxy_url: Option<String>) -> Self {
        if let Some(url) = search_url.filter(|u| !u.trim().is_empty()) {
            self.search_url = Some(url);
        }
        if let Some(url) = proxy_url.filter(|u| !u.trim().is_empty()) {
            self.proxy_url = Some(url);
        }
        self
    }

    pub fn search_url(&self) -> &str {
        self.search_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL)
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref().filter(|u| !u.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

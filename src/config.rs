//! Configuration file and environment overrides.
//!
//! Settings live in `~/.taskboard/config.toml` unless `--config` points elsewhere.
//! A missing file is not an error; every key has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::fields::ViewType;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const ENV_APP_URL: &str = "TB_APP_URL";
pub const ENV_COOKIE: &str = "TB_COOKIE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root; requests go to `<base_url>/api/...`.
    pub base_url: String,
    /// Raw cookie string; an `auth_token` entry becomes a bearer token.
    pub auth_cookie: Option<String>,
    pub default_view: ViewType,
    /// Where the dashboard writes its log. Without one the dashboard logs nothing.
    pub log_file: Option<PathBuf>,
    /// JSON array of tasks replacing the built-in seed list.
    pub seed_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_cookie: None,
            default_view: ViewType::List,
            log_file: None,
            seed_file: None,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let buf = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&buf).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `TB_APP_URL` / `TB_COOKIE` style overrides. `lookup` is usually
    /// `std::env::var(..).ok()`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_APP_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(cookie) = lookup(ENV_COOKIE) {
            self.auth_cookie = Some(cookie);
        }
        self
    }

    /// Load the file, then apply process environment overrides.
    pub fn resolve(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::load(path)?.with_overrides(|k| std::env::var(k).ok()))
    }
}

/// `~/.taskboard/config.toml`, or `./.taskboard/config.toml` without a HOME.
pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard").join("config.toml")
}

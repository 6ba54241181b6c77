//! Configuration loading and defaults.
//!
//! Settings come from an optional TOML file (`relplan.toml` in the working
//! directory, or the path in `RELPLAN_CONFIG`); every field has a default
//! so the viewer runs with no file at all. The base URL can additionally
//! be overridden by the first CLI argument.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_file() -> String {
    "relplan-tui.log".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Developer log file; the TUI owns the terminal, so logs go here.
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            log_file: default_log_file(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    fn path() -> PathBuf {
        std::env::var_os("RELPLAN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("relplan.toml"))
    }

    /// Load the config file, falling back to defaults when it is absent.
    /// A file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

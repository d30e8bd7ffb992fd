use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::common::constants::{
    DEFAULT_DELAY_MS, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS, PUBCHEM_BASE_URL,
};
use crate::common::error::{CuratorError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "curator.toml";

/// Runtime settings. Precedence: defaults < TOML file < environment < CLI flags.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Minimum delay between records, in milliseconds
    pub delay_ms: u64,
    /// Minimum delay between individual HTTP requests, in milliseconds (0 = off)
    pub request_delay_ms: u64,
    pub workers: usize,
    pub output_dir: String,
    pub log_dir: String,
    /// Single-byte field delimiter for input and output tables
    pub delimiter: char,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: PUBCHEM_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            delay_ms: DEFAULT_DELAY_MS,
            request_delay_ms: 0,
            workers: DEFAULT_WORKERS,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            log_dir: "logs".to_string(),
            delimiter: ',',
        }
    }
}

impl Config {
    /// Load from `path` if given (it must exist), else from `curator.toml` when
    /// present, else defaults; then apply `CURATOR_*` environment overrides.
    ///
    /// Not validated: call `validate()` once command-line flags are applied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CuratorError::Config(format!("Failed to read config file '{}': {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("CURATOR_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = lookup("CURATOR_TIMEOUT_SECS") {
            self.timeout_secs = parse_env("CURATOR_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("CURATOR_DELAY_MS") {
            self.delay_ms = parse_env("CURATOR_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("CURATOR_REQUEST_DELAY_MS") {
            self.request_delay_ms = parse_env("CURATOR_REQUEST_DELAY_MS", &v)?;
        }
        if let Some(v) = lookup("CURATOR_WORKERS") {
            self.workers = parse_env("CURATOR_WORKERS", &v)?;
        }
        if let Some(v) = lookup("CURATOR_OUTPUT_DIR") {
            self.output_dir = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(CuratorError::Config("timeout_secs must be greater than zero".to_string()));
        }
        if self.workers == 0 {
            return Err(CuratorError::Config("workers must be at least 1".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(CuratorError::Config("base_url must not be empty".to_string()));
        }
        self.delimiter_byte()?;
        Ok(())
    }

    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| CuratorError::Config(format!("delimiter '{}' must be a single ASCII character", self.delimiter)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CuratorError::Config(format!("{} has invalid value '{}'", key, value)))
}

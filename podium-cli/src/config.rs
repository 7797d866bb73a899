//! CLI configuration management

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use podium_core::logging::LoggingConfig;
use podium_core::{BatchPolicy, DeletePolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: String,
    pub output: OutputFormat,
    pub username: Option<String>,
    /// Per-request deadline for the HTTP client
    pub timeout_secs: u64,
    pub delete_policy: DeletePolicy,
    pub batch_policy: BatchPolicy,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: "http://localhost:8080".to_string(),
            output: OutputFormat::Table,
            username: None,
            timeout_secs: 30,
            delete_policy: DeletePolicy::default(),
            batch_policy: BatchPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load the config file, or the defaults when there is none
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::parse(&contents).with_context(|| format!("invalid config file {}", config_path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        Ok(PathBuf::from(home).join(".config/podium/cli.toml"))
    }
}

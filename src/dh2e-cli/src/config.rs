//! Configuration management for the dh2e CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub data_root: Option<PathBuf>,
    pub source_revision: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("dh2e");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Get the data root from config or None if not set
    pub fn get_data_root(&self) -> Option<&Path> {
        self.data_root.as_deref()
    }

    /// Set the data root in config
    pub fn set_data_root(&mut self, root: PathBuf) {
        self.data_root = Some(root);
    }

    /// Get the source revision from config or None if not set
    pub fn get_source_revision(&self) -> Option<&str> {
        self.source_revision.as_deref()
    }

    /// Set the source revision in config
    pub fn set_source_revision(&mut self, revision: String) {
        self.source_revision = Some(revision);
    }
}

//! Configuration management for jdkmatrix

pub mod schema;

pub use schema::{Config, MissingToolPolicy};

use crate::error::{MatrixError, MatrixResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jdkmatrix")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> MatrixResult<Config> {
        let config = if self.config_path.exists() {
            self.load_from_file(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            Config::default()
        };

        config.validate().map_err(|reason| MatrixError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        })?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> MatrixResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| MatrixError::io(format!("reading config from {}", path.display()), e))?;

        debug!("Loaded config from {}", path.display());
        toml::from_str(&content).map_err(|e| MatrixError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration loading.
//!
//! Reads `config.toml` and applies environment overrides on top.

use crate::paths::ViroPaths;
use std::path::{Path, PathBuf};
use viro_core::config::ViroConfig;
use viro_core::error::{Result, ViroError};

pub const ENV_CONFIG_PATH: &str = "VIRO_CONFIG";
pub const ENV_API_KEY: &str = "COHERE_API_KEY";
pub const ENV_BIND_ADDR: &str = "VIRO_BIND_ADDR";
pub const ENV_ENDPOINT: &str = "VIRO_ENDPOINT";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Resolves the config file from `explicit`, then `VIRO_CONFIG`, then
    /// the platform config directory.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os(ENV_CONFIG_PATH) {
                Some(path) => PathBuf::from(path),
                None => ViroPaths::default().config_file()?,
            },
        };
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file (defaults when missing) and applies the process
    /// environment.
    pub fn load(&self) -> Result<ViroConfig> {
        let config = self.load_file()?;
        Ok(apply_overrides(config, |key| std::env::var(key).ok()))
    }

    /// Loads the file only. A missing file yields the defaults.
    pub fn load_file(&self) -> Result<ViroConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file; using defaults");
            return Ok(ViroConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            ViroError::config(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Applies environment overrides read through `lookup`.
pub fn apply_overrides<F>(mut config: ViroConfig, lookup: F) -> ViroConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(key) = non_empty(ENV_API_KEY) {
        config.backend.api_key = Some(key);
    }
    if let Some(addr) = non_empty(ENV_BIND_ADDR) {
        config.server.bind_addr = addr;
    }
    if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
        config.client.endpoint = endpoint;
    }
    config
}

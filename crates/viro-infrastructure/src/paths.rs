//! Unified path management for viro configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/viro/              # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/viro/         # Data directory
//! └── history/                 # One record per user
//!     └── historial_<uid>.json
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "viro";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for viro_core::ViroError {
    fn from(err: PathError) -> Self {
        viro_core::ViroError::config(err.to_string())
    }
}

/// Resolves viro's platform directories.
///
/// An explicit base directory replaces both the config and the data root,
/// which keeps tests and portable installs self-contained.
#[derive(Debug, Clone, Default)]
pub struct ViroPaths {
    base: Option<PathBuf>,
}

impl ViroPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the viro configuration directory (e.g. `~/.config/viro/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    /// Returns the viro data directory (e.g. `~/.local/share/viro/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::HomeDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn history_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("history"))
    }
}

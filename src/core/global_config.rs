//! Global configuration management
//!
//! Reads settings from `config.toml` in the config directory: where the
//! flashing tool lives, the completion marker it prints, and output
//! preferences.

use crate::config::defaults::COMPLETION_MARKER;
use crate::infra::dirs::FbprogDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Global configuration error types
#[derive(Error, Debug)]
pub enum GlobalConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    ReadError { path: String, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    ParseError { path: String, error: String },
}

/// Global configuration for fbprog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Flashing tool settings
    #[serde(default)]
    pub tool: ToolConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,
}

/// Flashing tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Explicit path of the flashing tool executable
    pub path: Option<PathBuf>,

    /// Substring the tool prints when an operation completed
    pub completion_marker: Option<String>,
}

/// Output preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Show the per-partition progress bar
    pub progress: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GlobalConfigError::ParseError` if the config file exists but
    /// contains invalid TOML.
    pub fn load(dirs: &FbprogDirs) -> Result<Self, GlobalConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, GlobalConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| GlobalConfigError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| GlobalConfigError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Get the effective completion marker
    #[must_use]
    pub fn completion_marker(&self) -> &str {
        self.tool
            .completion_marker
            .as_deref()
            .unwrap_or(COMPLETION_MARKER)
    }

    /// Whether the progress bar should be drawn
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.output.progress.unwrap_or(true)
    }
}

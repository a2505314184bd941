//! Platform-specific directory management
//!
//! Provides the per-user configuration directory and locates the toolbox
//! root, the directory the bundled flashing tool is shipped under.
//!
//! Environment variables can override default directories:
//! - `FBPROG_CONFIG_DIR` - Override config directory
//! - `FBPROG_FASTBOOT` - Override the fastboot executable

use std::env;
use std::path::{Path, PathBuf};

use crate::config::defaults::{BUNDLED_TOOL, TOOL_NAME};

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "FBPROG_CONFIG_DIR";

/// Environment variable name for the fastboot executable override
pub const ENV_FASTBOOT: &str = "FBPROG_FASTBOOT";

/// Application name used in directory paths
const APP_NAME: &str = "fbprog";

/// Config file name inside the config directory
const CONFIG_FILE: &str = "config.toml";

/// Directory provider for fbprog
#[derive(Debug, Clone)]
pub struct FbprogDirs {
    config_dir: PathBuf,
    toolbox_root: PathBuf,
}

impl FbprogDirs {
    /// Create a new `FbprogDirs` instance
    ///
    /// Checks environment variables first, then falls back to platform defaults.
    /// The toolbox root is the directory holding the running executable.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
            toolbox_root: Self::resolve_toolbox_root(),
        }
    }

    /// Replace the toolbox root
    #[must_use]
    pub fn with_toolbox_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.toolbox_root = root.into();
        self
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/fbprog` or `~/.config/fbprog`
    /// - macOS: `~/Library/Application Support/fbprog`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Get the toolbox root directory
    #[must_use]
    pub fn toolbox_root(&self) -> &Path {
        &self.toolbox_root
    }

    /// Path of the flashing tool bundled under the toolbox root
    #[must_use]
    pub fn bundled_tool_path(&self) -> PathBuf {
        BUNDLED_TOOL
            .iter()
            .fold(self.toolbox_root.clone(), |path, part| path.join(part))
    }

    /// Resolve the fastboot executable to run
    ///
    /// Precedence is `explicit`, then `FBPROG_FASTBOOT`, then `configured`;
    /// a bare program name is looked up in PATH. Otherwise the bundled tool
    /// is used, or `fastboot` from PATH when the toolbox does not ship one.
    #[must_use]
    pub fn tool_path(&self, explicit: Option<&Path>, configured: Option<&Path>) -> PathBuf {
        let from_env = env::var_os(ENV_FASTBOOT).map(PathBuf::from);
        if let Some(path) = explicit.or(from_env.as_deref()).or(configured) {
            if path.components().count() == 1 && !path.exists() {
                return which::which(path).unwrap_or_else(|_| path.to_path_buf());
            }
            return path.to_path_buf();
        }

        let bundled = self.bundled_tool_path();
        if bundled.is_file() {
            return bundled;
        }
        which::which(TOOL_NAME).unwrap_or(bundled)
    }

    /// Resolve config directory from environment or platform default
    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }

    /// Resolve the directory containing the running executable
    fn resolve_toolbox_root() -> PathBuf {
        env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for FbprogDirs {
    fn default() -> Self {
        Self::new()
    }
}

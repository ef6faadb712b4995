//! Per-user locations for preferences and the scratch cache.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Overrides the preferences file location.
pub const PREFS_ENV: &str = "RECIPE_ROBOT_PREFS";
/// Overrides the scratch cache directory.
pub const CACHE_ENV: &str = "RECIPE_ROBOT_CACHE";

const APP_DIR: &str = "recipe-robot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotPaths {
    pub preferences_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl RobotPaths {
    /// Resolve from the environment, falling back to the platform config and cache dirs.
    pub fn from_env() -> Result<Self> {
        let preferences_path = match env::var_os(PREFS_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::config_dir()
                .context("no per-user config directory on this platform")?
                .join(APP_DIR)
                .join("preferences.toml"),
        };
        let cache_dir = match env::var_os(CACHE_ENV) {
            Some(path) => PathBuf::from(path),
            None => dirs::cache_dir()
                .context("no per-user cache directory on this platform")?
                .join(APP_DIR),
        };
        Ok(Self {
            preferences_path,
            cache_dir,
        })
    }

    /// Everything under one root; used by tests.
    pub fn under(root: &Path) -> Self {
        Self {
            preferences_path: root.join("preferences.toml"),
            cache_dir: root.join("cache"),
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

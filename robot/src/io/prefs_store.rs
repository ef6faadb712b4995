//! Preferences stored as TOML at a fixed per-user location.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::invariants::validate_preferences;
use crate::core::preferences::Preferences;

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences from disk.
    ///
    /// A missing file is the normal first-run state and yields `None`.
    pub fn load(&self) -> Result<Option<Preferences>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no preferences yet");
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let prefs: Preferences = toml::from_str(&contents)
            .with_context(|| format!("parse {}", self.path.display()))?;
        debug!(
            path = %self.path.display(),
            enabled = prefs.enabled_types.len(),
            count = prefs.recipe_create_count,
            "preferences loaded"
        );
        Ok(Some(prefs))
    }

    /// Atomically write preferences to disk (temp file + rename).
    pub fn save(&self, prefs: &Preferences) -> Result<()> {
        let errors = validate_preferences(prefs);
        if !errors.is_empty() {
            return Err(anyhow!("invalid preferences:\n- {}", errors.join("\n- ")));
        }
        debug!(path = %self.path.display(), version = %prefs.robot_version, "writing preferences");
        let mut buf = toml::to_string_pretty(prefs).context("serialize preferences toml")?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("preferences path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp preferences {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace preferences {}", path.display()))?;
    Ok(())
}

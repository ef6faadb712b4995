//! The durable preferences record.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTPUT_DIR: &str = "~/Library/AutoPkg/Recipe Robot Output";
pub const DEFAULT_DS_PACKAGES_PATH: &str = "/Volumes/DeployStudio/Packages";

/// User preferences persisted between runs.
///
/// Every field has a default so older or hand-edited files load without
/// complaint. `enabled_types` may name types this build does not know; those
/// are ignored when reflected into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// Reverse-domain prefix for generated recipe identifiers.
    pub identifier_prefix: String,

    /// Where generated recipes are written. May start with `~`.
    pub output_dir: String,

    pub enabled_types: Vec<String>,

    /// DeployStudio packages folder, used by `ds` recipes.
    pub ds_packages_path: Option<String>,

    /// Whether `jss` recipes follow the jss-recipes repository conventions.
    pub follow_official_jss: Option<bool>,

    /// Total recipes created so far.
    pub recipe_create_count: u64,

    /// Version of the robot that last wrote this record.
    pub robot_version: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            identifier_prefix: String::new(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            enabled_types: Vec::new(),
            ds_packages_path: None,
            follow_official_jss: None,
            recipe_create_count: 0,
            robot_version: String::new(),
        }
    }
}

impl Preferences {
    /// Seed values offered on the very first run.
    pub fn first_run(username: &str) -> Self {
        Self {
            identifier_prefix: format!("com.github.{username}"),
            ..Self::default()
        }
    }

    /// Fill in whatever a stored record lacks, using first-run defaults.
    ///
    /// Also drops repeated enabled types. Returns the names of the fields
    /// that changed; an empty list means the record was already complete.
    pub fn fill_missing(&mut self, username: &str) -> Vec<&'static str> {
        let mut filled = Vec::new();
        if self.identifier_prefix.trim().is_empty() {
            self.identifier_prefix = Self::first_run(username).identifier_prefix;
            filled.push("identifier_prefix");
        }
        if self.output_dir.trim().is_empty() {
            self.output_dir = DEFAULT_OUTPUT_DIR.to_string();
            filled.push("output_dir");
        }

        let listed = self.enabled_types.len();
        let mut seen = BTreeSet::new();
        self.enabled_types.retain(|kind| seen.insert(kind.clone()));
        if self.enabled_types.len() != listed {
            filled.push("enabled_types");
        }

        if self.is_enabled("ds")
            && self
                .ds_packages_path
                .as_deref()
                .is_none_or(|path| path.trim().is_empty())
        {
            self.ds_packages_path = Some(DEFAULT_DS_PACKAGES_PATH.to_string());
            filled.push("ds_packages_path");
        }
        if self.is_enabled("jss") && self.follow_official_jss.is_none() {
            self.follow_official_jss = Some(true);
            filled.push("follow_official_jss");
        }
        filled
    }

    pub fn stamp(&mut self, version: &str) {
        self.robot_version = version.to_string();
    }

    pub fn is_enabled(&self, kind: &str) -> bool {
        self.enabled_types.iter().any(|enabled| enabled == kind)
    }
}

/// Drop trailing `separator` characters from a user-entered value.
pub fn trim_trailing(value: &str, separator: char) -> String {
    value.trim().trim_end_matches(separator).to_string()
}

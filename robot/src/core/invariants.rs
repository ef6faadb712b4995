//! Semantic invariants of a preferences record that serde cannot express.

use crate::core::preferences::Preferences;

/// Check a record before it is persisted:
/// - Identifier prefix and output directory are non-empty
/// - No duplicate enabled types
/// - `ds` needs a packages path, `jss` needs a style choice
pub fn validate_preferences(prefs: &Preferences) -> Vec<String> {
    let mut errors = Vec::new();

    if prefs.identifier_prefix.trim().is_empty() {
        errors.push("identifier_prefix must not be empty".to_string());
    }
    if prefs.output_dir.trim().is_empty() {
        errors.push("output_dir must not be empty".to_string());
    }

    for (index, kind) in prefs.enabled_types.iter().enumerate() {
        if prefs.enabled_types[..index].contains(kind) {
            errors.push(format!("duplicate enabled type '{kind}'"));
        }
    }

    if prefs.is_enabled("ds")
        && prefs
            .ds_packages_path
            .as_deref()
            .is_none_or(|path| path.trim().is_empty())
    {
        errors.push("ds is enabled but ds_packages_path is not set".to_string());
    }
    if prefs.is_enabled("jss") && prefs.follow_official_jss.is_none() {
        errors.push("jss is enabled but follow_official_jss is not set".to_string());
    }

    errors
}

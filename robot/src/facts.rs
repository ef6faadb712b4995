//! The fact context threaded through every pipeline stage.
//!
//! One `Facts` value is created per run and passed as `&mut Facts` to each
//! stage and collaborator. Warnings and errors are append-only; once any error
//! is recorded the run is reported as failed.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cli::Args;
use crate::core::catalog::Catalog;

#[derive(Debug, Serialize)]
pub struct Facts {
    pub args: Args,
    warnings: Vec<String>,
    errors: Vec<String>,
    pub catalog: Catalog,
    duration: Option<Duration>,
    values: BTreeMap<String, Value>,
}

impl Facts {
    pub fn new(args: Args, catalog: Catalog) -> Self {
        Self {
            args,
            warnings: Vec::new(),
            errors: Vec::new(),
            catalog,
            duration: None,
            values: BTreeMap::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "warning recorded");
        self.warnings.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!(%message, "error recorded");
        self.errors.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// True once any error has been recorded.
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Record a named fact, replacing any previous value for `key`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        debug!(key, %value, "fact recorded");
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Record how long recipe generation took.
    pub fn record_duration(&mut self, elapsed: Duration) {
        debug!(seconds = elapsed.as_secs_f64(), "duration recorded");
        self.duration = Some(elapsed);
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> Facts {
        Facts::new(Args::default(), Catalog::standard())
    }

    #[test]
    fn warnings_do_not_fail_the_run() {
        let mut facts = facts();
        facts.warn("first");
        facts.warn("second");
        assert_eq!(facts.warnings(), ["first", "second"]);
        assert!(!facts.failed());
    }

    #[test]
    fn any_error_fails_the_run() {
        let mut facts = facts();
        facts.error("boom");
        assert!(facts.failed());
        assert_eq!(facts.errors(), ["boom"]);
    }

    #[test]
    fn facts_are_keyed_values() {
        let mut facts = facts();
        facts.set("app_name", "Thing");
        facts.set("github_token_found", false);
        facts.set("app_name", "Other");
        assert_eq!(facts.get_str("app_name"), Some("Other"));
        assert_eq!(facts.get("github_token_found"), Some(&Value::Bool(false)));
        assert_eq!(facts.get("missing"), None);
    }

    #[test]
    fn dump_includes_catalog_and_values() {
        let mut facts = facts();
        facts.set("input_type", "app");
        let json = serde_json::to_value(&facts).expect("serialize");
        assert_eq!(json["values"]["input_type"], "app");
        assert_eq!(json["catalog"][0]["type"], "download");
    }

    #[test]
    fn duration_is_recorded_once_known() {
        let mut facts = facts();
        assert_eq!(facts.duration(), None);
        facts.record_duration(Duration::from_millis(1500));
        assert_eq!(facts.duration(), Some(Duration::from_millis(1500)));
        let json = serde_json::to_value(&facts).expect("serialize");
        assert_eq!(json["duration"]["secs"], 1);
    }
}

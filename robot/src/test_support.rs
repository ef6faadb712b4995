//! Test-only helpers: a scripted console, scripted collaborators and a
//! throwaway home for preferences and cache.

use std::cell::Cell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::preferences::Preferences;
use crate::error::{DomainError, Failure};
use crate::facts::Facts;
use crate::io::console::{Console, Tone};
use crate::io::generate::{Generation, Generator};
use crate::io::inspect::Inspector;
use crate::io::paths::RobotPaths;
use crate::io::prefs_store::PreferenceStore;

/// Console that replays queued input lines and records everything shown.
///
/// Once the queue is empty, `read_line` reports closed input.
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    emitted: Vec<(Tone, String)>,
    prompts: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: lines.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// All emitted messages joined by newlines.
    pub fn transcript(&self) -> String {
        self.emitted
            .iter()
            .map(|(_, message)| message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn count(&self, tone: Tone) -> usize {
        self.emitted.iter().filter(|(t, _)| *t == tone).count()
    }

    /// True if some message with `tone` contains `needle`.
    pub fn saw(&self, tone: Tone, needle: &str) -> bool {
        self.emitted
            .iter()
            .any(|(t, message)| *t == tone && message.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn emit(&mut self, tone: Tone, message: &str) {
        self.emitted.push((tone, message.to_string()));
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front())
    }
}

/// What a scripted collaborator does when called.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Succeed after recording these facts.
    Facts(Vec<(String, Value)>),
    /// Record an error in the facts but return `Ok`.
    RecordError(String),
    /// Return a domain error.
    Domain(String),
    /// Return an unexpected error.
    Unexpected(String),
}

impl Scripted {
    pub fn facts<const N: usize>(pairs: [(&str, &str); N]) -> Self {
        Scripted::Facts(
            pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), Value::from(value)))
                .collect(),
        )
    }

    fn play(&self, facts: &mut Facts) -> Result<(), Failure> {
        match self {
            Scripted::Facts(pairs) => {
                for (key, value) in pairs {
                    facts.set(key, value.clone());
                }
                Ok(())
            }
            Scripted::RecordError(message) => {
                facts.error(message.clone());
                Ok(())
            }
            Scripted::Domain(message) => Err(DomainError::with_cause(
                message.clone(),
                anyhow!("scripted cause"),
            )
            .into()),
            Scripted::Unexpected(message) => Err(anyhow!(message.clone()).into()),
        }
    }
}

pub struct ScriptedInspector {
    script: Scripted,
    calls: Cell<usize>,
}

impl ScriptedInspector {
    pub fn new(script: Scripted) -> Self {
        Self {
            script,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Inspector for ScriptedInspector {
    fn inspect(&self, facts: &mut Facts) -> Result<(), Failure> {
        self.calls.set(self.calls.get() + 1);
        self.script.play(facts)
    }
}

/// Generator that "writes" one recipe per enabled type without touching disk,
/// unless its script fails first.
pub struct ScriptedGenerator {
    script: Scripted,
    calls: Cell<usize>,
}

impl ScriptedGenerator {
    pub fn new(script: Scripted) -> Self {
        Self {
            script,
            calls: Cell::new(0),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Scripted::Facts(Vec::new()))
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, facts: &mut Facts, prefs: &Preferences) -> Result<Generation, Failure> {
        self.calls.set(self.calls.get() + 1);
        self.script.play(facts)?;
        let app = facts.get_str("app_name").unwrap_or("App").to_string();
        Ok(Generation {
            recipes: prefs
                .enabled_types
                .iter()
                .map(|kind| PathBuf::from(format!("{app}.{kind}.recipe")))
                .collect(),
            elapsed: Duration::from_millis(1500),
        })
    }
}

/// Temporary location for preferences and cache.
pub struct TestHome {
    temp: TempDir,
    paths: RobotPaths,
}

impl TestHome {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let paths = RobotPaths::under(temp.path());
        Ok(Self { temp, paths })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> &RobotPaths {
        &self.paths
    }

    pub fn store(&self) -> PreferenceStore {
        PreferenceStore::new(&self.paths.preferences_path)
    }

    pub fn write_prefs(&self, prefs: &Preferences) -> Result<()> {
        self.store().save(prefs)
    }

    /// Write a preferences file verbatim, bypassing validation.
    pub fn write_raw_prefs(&self, contents: &str) -> Result<()> {
        let path = &self.paths.preferences_path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn read_prefs(&self) -> Result<Option<Preferences>> {
        self.store().load()
    }
}

/// A valid stored record with `download` and `munki` enabled.
pub fn stored_preferences(output_dir: &Path) -> Preferences {
    Preferences {
        identifier_prefix: "com.github.tester".to_string(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        enabled_types: vec!["download".to_string(), "munki".to_string()],
        recipe_create_count: 10,
        robot_version: "0.0.1".to_string(),
        ..Preferences::default()
    }
}

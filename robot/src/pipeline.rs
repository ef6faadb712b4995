//! Orchestration of one `recipe-robot` run.
//!
//! Stages run in a fixed order: setup, preference resolution, inspection,
//! generation, reporting. A [`CleanupGuard`] armed during setup removes the
//! scratch cache and restores the terminal however the stages end (success,
//! failure, user abort, or panic). In debug mode each stage refreshes a state
//! dump held by the guard, printed at the end or by an interrupt. Every
//! [`Failure`] funnels through [`Pipeline::report`], the single place that
//! decides output and exit status.

use std::path::PathBuf;

use clap::CommandFactory;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::core::catalog::Catalog;
use crate::core::preferences::Preferences;
use crate::error::{DomainError, Failure};
use crate::exit_codes;
use crate::facts::Facts;
use crate::io::cleanup::{CleanupGuard, CleanupHandle, CleanupTask, create_cache};
use crate::io::console::{Console, Tone};
use crate::io::generate::{Generation, Generator};
use crate::io::inspect::Inspector;
use crate::io::interrupt;
use crate::io::paths::RobotPaths;
use crate::io::prefs_store::PreferenceStore;
use crate::reconcile;

/// Version stamped into preferences on every save.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing to do; usage was printed.
    Usage,
    /// Preferences were edited and saved; no input to process.
    Configured,
    /// Recipes were generated.
    Completed { recipes: Vec<PathBuf> },
    /// The user stopped the run.
    Aborted,
    /// A domain or unexpected error was reported.
    Failed,
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Failed => exit_codes::FAILED,
            RunStatus::Usage
            | RunStatus::Configured
            | RunStatus::Completed { .. }
            | RunStatus::Aborted => exit_codes::OK,
        }
    }
}

enum Completion {
    Configured,
    Generated(Generation),
}

/// Full state written to the console in `--debug` mode.
#[derive(Serialize)]
struct StateDump<'a> {
    facts: &'a Facts,
    preferences: Option<&'a Preferences>,
}

pub struct Pipeline<'a, C, I, G> {
    paths: RobotPaths,
    console: &'a mut C,
    inspector: &'a I,
    generator: &'a G,
    username: String,
    watch_interrupts: bool,
    state: Option<CleanupHandle>,
}

impl<'a, C: Console, I: Inspector, G: Generator> Pipeline<'a, C, I, G> {
    pub fn new(paths: RobotPaths, console: &'a mut C, inspector: &'a I, generator: &'a G) -> Self {
        Self {
            paths,
            console,
            inspector,
            generator,
            username: whoami::username(),
            watch_interrupts: false,
            state: None,
        }
    }

    /// Username used to seed the identifier prefix on a first run.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Route SIGINT/SIGTERM through cleanup. Only the binary turns this on.
    pub fn watch_interrupts(mut self, enabled: bool) -> Self {
        self.watch_interrupts = enabled;
        self
    }

    pub fn run(mut self, args: Args) -> RunStatus {
        if !args.has_work() {
            let usage = Args::command().render_help().to_string();
            self.console.emit(Tone::Plain, &usage);
            return RunStatus::Usage;
        }

        let mut facts = Facts::new(args, Catalog::standard());
        let guard = CleanupGuard::arm(CleanupTask {
            cache_dir: self.paths.cache_dir.clone(),
            keep_cache: facts.args.keep_cache,
            restore_terminal: !facts.args.app_mode,
            dump_state: facts.args.debug,
        });
        if self.watch_interrupts
            && let Err(err) = interrupt::install(guard.handle())
        {
            warn!(error = %format!("{err:#}"), "could not install interrupt handler");
        }
        self.state = facts.args.debug.then(|| guard.handle());

        let mut prefs = None;
        let result = self.stages(&mut facts, &mut prefs);
        let status = self.report(result, &mut facts, prefs.as_ref());

        self.checkpoint(&facts, prefs.as_ref());
        if let Some(dump) = guard.handle().take_state() {
            self.console.emit(Tone::Debug, &dump);
        }
        drop(guard);
        info!(status = ?status, "run finished");
        status
    }

    fn stages(
        &mut self,
        facts: &mut Facts,
        prefs_slot: &mut Option<Preferences>,
    ) -> Result<Completion, Failure> {
        self.setup(facts)?;
        self.checkpoint(facts, None);
        let prefs = prefs_slot.insert(self.resolve_preferences(facts)?);
        self.checkpoint(facts, Some(&*prefs));

        if facts.args.input_path.is_none() {
            return Ok(Completion::Configured);
        }

        self.console.emit(Tone::Verbose, "Inspecting input...");
        self.inspector.inspect(facts)?;
        self.checkpoint(facts, Some(&*prefs));
        stop_if_failed(facts, "inspection")?;

        self.console.emit(Tone::Verbose, "Generating recipes...");
        let generation = self.generator.generate(facts, prefs)?;
        facts.record_duration(generation.elapsed);
        self.checkpoint(facts, Some(&*prefs));
        stop_if_failed(facts, "recipe generation")?;

        prefs.recipe_create_count += generation.recipes.len() as u64;
        self.store()
            .save(prefs)
            .map_err(|err| DomainError::with_cause("Unable to save preferences", err))?;
        Ok(Completion::Generated(generation))
    }

    fn setup(&mut self, facts: &mut Facts) -> Result<(), Failure> {
        if facts.args.ignore_existing {
            facts.warn(
                "Recipes will be generated even if they already exist in the output location.",
            );
        }
        create_cache(&self.paths.cache_dir)?;
        debug!(cache = %self.paths.cache_dir.display(), "cache ready");
        Ok(())
    }

    /// Load, optionally edit, then always persist the preferences.
    fn resolve_preferences(&mut self, facts: &mut Facts) -> Result<Preferences, Failure> {
        let store = self.store();
        let existing = store
            .load()
            .map_err(|err| DomainError::with_cause("Unable to read preferences", err))?;
        let mut prefs = reconcile::resolve(
            &mut *self.console,
            &mut facts.catalog,
            existing,
            facts.args.config,
            &self.username,
        )?;
        prefs.stamp(VERSION);
        store
            .save(&prefs)
            .map_err(|err| DomainError::with_cause("Unable to save preferences", err))?;
        if facts.args.config {
            self.console.emit(
                Tone::Success,
                &format!("Preferences saved to {}.", store.path().display()),
            );
        }
        Ok(prefs)
    }

    fn report(
        &mut self,
        result: Result<Completion, Failure>,
        facts: &mut Facts,
        prefs: Option<&Preferences>,
    ) -> RunStatus {
        let status = match result {
            Ok(Completion::Configured) => RunStatus::Configured,
            Ok(Completion::Generated(generation)) => {
                self.congratulate(facts, prefs, &generation);
                RunStatus::Completed {
                    recipes: generation.recipes,
                }
            }
            Err(Failure::Aborted(reason)) => {
                info!(%reason, "run cancelled");
                self.console.emit(Tone::Plain, &format!("Cancelled: {reason}."));
                RunStatus::Aborted
            }
            Err(Failure::Domain(err)) => {
                facts.error(err.message.clone());
                self.print_errors(facts);
                if let Some(cause) = err.cause.filter(|_| facts.args.debug) {
                    self.console.emit(Tone::Debug, &format!("Caused by: {cause:#}"));
                }
                RunStatus::Failed
            }
            Err(Failure::Unexpected(err)) => {
                facts.error("Recipe Robot ran into an unexpected problem.");
                self.print_errors(facts);
                if facts.args.is_verbose() {
                    self.console.emit(Tone::Debug, &format!("{err:?}"));
                } else {
                    self.console.emit(Tone::Plain, "Run again with --verbose for more details.");
                }
                RunStatus::Failed
            }
        };
        self.print_warnings(facts);
        status
    }

    fn congratulate(
        &mut self,
        facts: &Facts,
        prefs: Option<&Preferences>,
        generation: &Generation,
    ) {
        for path in &generation.recipes {
            self.console.emit(Tone::Verbose, &format!("    {}", path.display()));
        }
        let seconds = facts.duration().unwrap_or(generation.elapsed).as_secs_f64();
        self.console.emit(
            Tone::Plain,
            &format!(
                "Generated {} recipe(s) in {seconds:.2} seconds.",
                generation.recipes.len()
            ),
        );
        if let Some(prefs) = prefs {
            self.console.emit(
                Tone::Success,
                &format!(
                    "You've now created {} recipes with Recipe Robot. Well done!",
                    prefs.recipe_create_count
                ),
            );
        }
    }

    fn print_errors(&mut self, facts: &Facts) {
        for message in facts.errors() {
            self.console.emit(Tone::Error, message);
        }
    }

    fn print_warnings(&mut self, facts: &Facts) {
        for message in facts.warnings() {
            self.console.emit(Tone::Warning, message);
        }
    }

    /// Refresh the state dump held for cleanup. No-op outside debug mode.
    fn checkpoint(&self, facts: &Facts, prefs: Option<&Preferences>) {
        let Some(handle) = &self.state else {
            return;
        };
        let dump = StateDump {
            facts,
            preferences: prefs,
        };
        match serde_json::to_string_pretty(&dump) {
            Ok(json) => handle.record_state(json),
            Err(err) => warn!(error = %err, "could not serialize state dump"),
        }
    }

    fn store(&self) -> PreferenceStore {
        PreferenceStore::new(&self.paths.preferences_path)
    }
}

fn stop_if_failed(facts: &Facts, stage: &str) -> Result<(), Failure> {
    if facts.failed() {
        return Err(Failure::domain(format!(
            "Stopped after {stage} with {} error(s).",
            facts.errors().len()
        )));
    }
    Ok(())
}

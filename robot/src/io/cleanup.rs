//! Guaranteed end-of-run cleanup.
//!
//! A [`CleanupGuard`] is armed before the scratch cache is created and runs its
//! task when dropped, whichever way the pipeline ends. The same task can be
//! fired from the interrupt watcher through a [`CleanupHandle`]; it runs at
//! most once no matter how many paths reach it. In debug mode the handle also
//! holds the latest state dump, so an interrupted run still prints one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::io::console::restore_terminal;

/// What has to be undone at the end of a run.
#[derive(Debug, Clone)]
pub struct CleanupTask {
    pub cache_dir: PathBuf,
    pub keep_cache: bool,
    pub restore_terminal: bool,
    /// Print the last recorded state dump to stderr.
    pub dump_state: bool,
}

impl CleanupTask {
    fn run(&self) {
        if self.restore_terminal {
            restore_terminal();
        }
        if self.keep_cache {
            debug!(dir = %self.cache_dir.display(), "keeping cache");
            return;
        }
        if let Err(err) = remove_cache(&self.cache_dir) {
            warn!(error = %format!("{err:#}"), "cache cleanup failed");
        }
    }
}

fn remove_cache(dir: &Path) -> Result<()> {
    if dir.exists() {
        debug!(dir = %dir.display(), "removing cache");
        fs::remove_dir_all(dir).with_context(|| format!("remove cache dir {}", dir.display()))?;
    }
    Ok(())
}

/// Shared, fire-once access to the cleanup task.
#[derive(Debug, Clone)]
pub struct CleanupHandle {
    task: Arc<Mutex<Option<CleanupTask>>>,
    state: Arc<Mutex<Option<String>>>,
}

impl CleanupHandle {
    /// Replace the state dump printed if cleanup fires before the run reports.
    pub fn record_state(&self, dump: String) {
        *lock(&self.state) = Some(dump);
    }

    pub fn take_state(&self) -> Option<String> {
        lock(&self.state).take()
    }

    /// Run the task if nobody has yet. Returns whether this call ran it.
    pub fn fire(&self) -> bool {
        let Some(task) = lock(&self.task).take() else {
            return false;
        };
        if let Some(state) = self.take_state()
            && task.dump_state
        {
            eprintln!("{state}");
        }
        task.run();
        true
    }
}

fn lock<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    match slot.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Runs the cleanup task on drop.
#[derive(Debug)]
pub struct CleanupGuard {
    handle: CleanupHandle,
}

impl CleanupGuard {
    pub fn arm(task: CleanupTask) -> Self {
        Self {
            handle: CleanupHandle {
                task: Arc::new(Mutex::new(Some(task))),
                state: Arc::new(Mutex::new(None)),
            },
        }
    }

    pub fn handle(&self) -> CleanupHandle {
        self.handle.clone()
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.handle.fire();
    }
}

/// Create the scratch cache directory.
pub fn create_cache(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create cache dir {}", dir.display()))
}

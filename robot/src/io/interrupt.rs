//! Ctrl-C / SIGTERM handling.

use anyhow::Result;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::thread;
use tracing::{debug, info};

use crate::exit_codes;
use crate::io::cleanup::CleanupHandle;

/// Watch for interrupts on a background thread.
///
/// An interrupt is a user abort: cleanup runs (once, shared with the guard),
/// a notice is printed and the process exits successfully. Once the run has
/// fired cleanup itself its exit status stands and interrupts are ignored.
pub fn install(cleanup: CleanupHandle) -> Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;

    thread::spawn(move || {
        for sig in signals.forever() {
            info!(signal = sig, "interrupted");
            if let Some(code) = on_interrupt(&cleanup) {
                std::process::exit(code);
            }
        }
    });

    Ok(())
}

fn on_interrupt(cleanup: &CleanupHandle) -> Option<i32> {
    if !cleanup.fire() {
        debug!("run already cleaned up; leaving exit status to it");
        return None;
    }
    eprintln!("\nCancelled by user.");
    Some(exit_codes::OK)
}

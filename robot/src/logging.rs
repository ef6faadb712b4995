//! Development-time tracing for debugging the robot.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: Dev diagnostics via `RUST_LOG`, output to stderr.
//!   Not part of the product output.
//!
//! - **Console (`io/console`)**: Menus, prompts, warnings and the final summary
//!   shown to the user. Always written, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How chatty the default filter should be when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        match (verbose, debug) {
            (_, true) => Verbosity::Debug,
            (true, false) => Verbosity::Verbose,
            (false, false) => Verbosity::Quiet,
        }
    }

    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Verbose => "warn,robot=info",
            Verbosity::Debug => "warn,robot=debug",
        }
    }
}

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Falls back to a filter derived from `verbosity`.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=robot=trace recipe-robot ~/Applications/Thing.app
/// ```
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_verbose() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Quiet);
    }
}

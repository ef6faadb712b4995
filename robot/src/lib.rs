//! Orchestration shell for generating AutoPkg-style recipes.
//!
//! A run resolves the user's preferences (editing them interactively when
//! asked or on first use), hands the input to an inspector and a generator,
//! and reports the outcome. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (catalog, menu commands,
//!   preferences, input classification). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (preference storage, terminal,
//!   cache cleanup, signals, inspection and generation collaborators).
//!
//! Orchestration modules ([`reconcile`], [`pipeline`]) coordinate core logic
//! with I/O to implement the CLI.

pub mod cli;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod facts;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod reconcile;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

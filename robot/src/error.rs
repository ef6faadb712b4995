//! Failure taxonomy for a pipeline run.
//!
//! Every stage returns [`Failure`]; a single handler in [`crate::pipeline`]
//! turns it into user-facing output and an exit code.

use std::fmt;

use thiserror::Error;

/// Why the user stopped the run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abort {
    /// `Q` at the recipe type menu.
    MenuQuit,
    /// Standard input closed while a prompt was waiting.
    EndOfInput,
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Abort::MenuQuit => f.write_str("quit without saving preferences"),
            Abort::EndOfInput => f.write_str("input closed"),
        }
    }
}

/// A recognized, named failure raised by a stage.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DomainError {
    pub message: String,
    /// Underlying cause; only shown in debug mode.
    pub cause: Option<anyhow::Error>,
}

impl DomainError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: anyhow::Error) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause),
        }
    }
}

/// Outcome of a stage that did not complete.
#[derive(Debug, Error)]
pub enum Failure {
    /// User-initiated stop. Not an error: exits with status 0.
    #[error("cancelled: {0}")]
    Aborted(Abort),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Failure {
    pub fn domain(message: impl Into<String>) -> Self {
        Failure::Domain(DomainError::new(message))
    }
}

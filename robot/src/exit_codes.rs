//! Stable exit codes for `recipe-robot`.

/// Run succeeded, only usage was printed, or the user cancelled.
pub const OK: i32 = 0;
/// A domain or unexpected error was reported.
pub const FAILED: i32 = 1;

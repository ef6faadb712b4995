//! I/O helpers for the robot's stages.

pub mod cleanup;
pub mod console;
pub mod generate;
pub mod inspect;
pub mod interrupt;
pub mod paths;
pub mod prefs_store;

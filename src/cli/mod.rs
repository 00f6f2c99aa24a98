//! CLI commands
//!
//! Command implementations for the `balrogscript` binary.

mod progress;
mod style;
mod submit;

pub use submit::run_submit;

//! Command-Line Interface
//!
//! Argument parsing, config assembly and dispatch into the node runtime.

pub mod args;
pub mod commands;
pub mod errors;

pub use commands::run;
pub use errors::{CliError, CliResult};

//! Command-line front end for the bundled demos.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ListArgs, OutputFormat, RunArgs, Verbosity};

//! CLI layer: argument parsing, session scripts and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod render;
pub mod script;

pub use args::{Cli, Commands};
pub use error::{CliError, CliResult};

//! CLI module

mod commands;
mod error;
mod runner;

pub use commands::Cli;
pub use error::CliError;
pub use runner::{run, RunReport};

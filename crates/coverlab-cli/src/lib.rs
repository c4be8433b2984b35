//! Coverlab CLI library.
//!
//! Students compute their confidence interval locally, submit it to the
//! classroom service, and browse the class results. This crate holds the
//! argument parsing, profile configuration, command execution and output
//! formatting behind the `coverlab` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod repl;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

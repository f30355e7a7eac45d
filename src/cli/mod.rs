//! CLI module for oem-minimize
//!
//! Provides command-line interface for:
//! - minimize: structured record on stdin, compact container on stdout
//! - maximize: compact container on stdin, structured record on stdout
//! - describe: key tables and mounts of a protocol
//! - protocols: registered protocol names
//! - check: append-only evolution check of two declarations

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, describe, execute, maximize, minimize, protocols, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_response};

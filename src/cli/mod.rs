//! CLI module for molc
//!
//! Provides command-line interface for:
//! - check: Load, validate and compile a schema
//! - layout: Report the kind and size of compiled types
//! - verify: Check a hex buffer against a compiled type
//!
//! Every command writes exactly one JSON object to stdout. Logs go to stderr.

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command, SchemaSource};
pub use commands::{check, decode_hex, layout, run, run_command, verify};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};

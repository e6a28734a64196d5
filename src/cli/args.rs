//! CLI argument definitions using clap
//!
//! Commands:
//! - molc check  [--config <path>] [--schema <path>]
//! - molc layout [--config <path>] [--schema <path>] [--type <name>]
//! - molc verify [--config <path>] [--schema <path>] --type <name> --hex <hex> [--compatible]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// molc - compile molecule schemas and check buffers against them
#[derive(Parser, Debug)]
#[command(name = "molc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where the schema comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SchemaSource {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to schema file (overrides the configured one)
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, validate and compile the schema
    Check {
        #[command(flatten)]
        source: SchemaSource,
    },

    /// Print the kind and byte length of compiled types
    Layout {
        #[command(flatten)]
        source: SchemaSource,

        /// Only show this type
        #[arg(long = "type")]
        type_name: Option<String>,
    },

    /// Check that a hex buffer is a well-formed encoding of a type
    Verify {
        #[command(flatten)]
        source: SchemaSource,

        /// Type to verify against
        #[arg(long = "type")]
        type_name: String,

        /// Buffer as hex, with or without a 0x prefix
        #[arg(long)]
        hex: String,

        /// Accept tables with extra trailing fields
        #[arg(long)]
        compatible: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

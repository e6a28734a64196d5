//! `molc.json` configuration
//!
//! ```json
//! {
//!   "schema_file": "schemas/blockchain.mol",
//!   "compatible": false,
//!   "numeric_aliases": true,
//!   "log_level": "warn"
//! }
//! ```
//!
//! Only `schema_file` is required. A relative `schema_file` is resolved
//! against the directory containing the configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::args::SchemaSource;
use super::errors::{CliError, CliResult};
use crate::compiler::CompilerOptions;
use crate::observability::{log_event_with_fields, Event, Severity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema file to compile (required)
    pub schema_file: PathBuf,

    /// Default for buffer verification (optional, default false)
    #[serde(default)]
    pub compatible: bool,

    /// Compile UintN declarations to numeric codecs (optional, default true)
    #[serde(default = "default_numeric_aliases")]
    pub numeric_aliases: bool,

    /// Minimum log severity (optional, default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_numeric_aliases() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Config with defaults for a schema given on the command line
    pub fn for_schema(schema_file: impl Into<PathBuf>) -> Self {
        Self {
            schema_file: schema_file.into(),
            compatible: false,
            numeric_aliases: default_numeric_aliases(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        if config.schema_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.schema_file = dir.join(&config.schema_file);
            }
        }

        let shown = path.display().to_string();
        log_event_with_fields(Event::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    /// Builds the effective config from command line flags.
    ///
    /// `--schema` overrides `schema_file` from `--config`; at least one of
    /// the two is required.
    pub fn resolve(source: &SchemaSource) -> CliResult<Self> {
        let mut config = match (&source.config, &source.schema) {
            (Some(path), _) => Self::load(path)?,
            (None, Some(schema)) => Self::for_schema(schema),
            (None, None) => {
                return Err(CliError::config_error(
                    "either --config or --schema is required",
                ))
            }
        };
        if let Some(schema) = &source.schema {
            config.schema_file = schema.clone();
        }
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> CliResult<()> {
        if self.schema_file.as_os_str().is_empty() {
            return Err(CliError::config_error("schema_file must not be empty"));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse::<Severity>().map_err(CliError::config_error)
    }

    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            numeric_aliases: self.numeric_aliases,
        }
    }
}

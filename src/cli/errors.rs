//! CLI-specific error types
//!
//! A CLI error keeps the code of the library error that caused it, so the
//! JSON error output reports e.g. `MOL_CODEC_INVALID_LAYOUT` rather than a
//! generic CLI code.

use std::fmt;
use std::io;

use crate::codec::CodecError;
use crate::compiler::CompileError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, files)
    IoError,
    /// Command line input could not be used
    InvalidInput,
    /// Schema failed to load or compile
    SchemaError,
    /// Buffer failed verification
    BufferRejected,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "MOL_CLI_CONFIG_ERROR",
            Self::IoError => "MOL_CLI_IO_ERROR",
            Self::InvalidInput => "MOL_CLI_INVALID_INPUT",
            Self::SchemaError => "MOL_CLI_SCHEMA_ERROR",
            Self::BufferRejected => "MOL_CLI_BUFFER_REJECTED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    /// Code of the underlying library error, if any
    cause_code: Option<&'static str>,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            cause_code: None,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// The most specific code available
    pub fn code_str(&self) -> &'static str {
        self.cause_code.unwrap_or_else(|| self.code.code())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", err))
    }
}

impl From<hex::FromHexError> for CliError {
    fn from(err: hex::FromHexError) -> Self {
        Self::invalid_input(format!("invalid hex buffer: {}", err))
    }
}

impl From<CompileError> for CliError {
    fn from(err: CompileError) -> Self {
        Self {
            code: CliErrorCode::SchemaError,
            cause_code: Some(err.code()),
            message: err.to_string(),
        }
    }
}

impl From<CodecError> for CliError {
    fn from(err: CodecError) -> Self {
        Self {
            code: CliErrorCode::BufferRejected,
            cause_code: Some(err.code().code()),
            message: format!("{} at {}", err.kind(), err.path()),
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

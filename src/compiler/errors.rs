//! Compiler error types
//!
//! Error codes:
//! - MOL_SCHEMA_*: the schema failed parsing, loading or validation
//! - MOL_COMPILE_INVALID_CODEC: a declaration could not be turned into a codec
//! - MOL_COMPILE_UNKNOWN_CODEC: lookup of a name the table does not contain

use thiserror::Error;

use crate::codec::CodecError;
use crate::schema::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("MOL_COMPILE_INVALID_CODEC: {name}: {source}")]
    Codec { name: String, source: CodecError },

    #[error("MOL_COMPILE_UNKNOWN_CODEC: no codec named '{0}'")]
    UnknownCodec(String),
}

impl CompileError {
    pub fn codec(name: &str, source: CodecError) -> Self {
        CompileError::Codec {
            name: name.to_string(),
            source,
        }
    }

    /// Stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Schema(e) => e.code().code(),
            CompileError::Codec { .. } => "MOL_COMPILE_INVALID_CODEC",
            CompileError::UnknownCodec(_) => "MOL_COMPILE_UNKNOWN_CODEC",
        }
    }
}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

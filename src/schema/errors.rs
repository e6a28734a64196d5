//! Schema error types
//!
//! Error codes:
//! - MOL_SCHEMA_PARSE_ERROR: schema text does not match the grammar
//! - MOL_SCHEMA_DUPLICATE_NAME: two declarations share a name
//! - MOL_SCHEMA_DUPLICATE_FIELD: two fields or union items share a name
//! - MOL_SCHEMA_UNKNOWN_TYPE: reference to an undeclared type
//! - MOL_SCHEMA_NOT_FIXED: variable-size type used where a fixed one is required
//! - MOL_SCHEMA_INVALID_DECLARATION: declaration is structurally invalid
//! - MOL_SCHEMA_CIRCULAR_DEPENDENCY: declarations depend on each other in a cycle
//! - MOL_SCHEMA_IO_ERROR: schema file could not be read
//!
//! All schema errors abort the whole load; no partial schema is usable.

use std::fmt;
use std::path::{Path, PathBuf};

use super::types::Location;

/// Schema error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    ParseError,
    DuplicateName,
    DuplicateField,
    UnknownType,
    NotFixedLength,
    InvalidDeclaration,
    CircularDependency,
    IoError,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::ParseError => "MOL_SCHEMA_PARSE_ERROR",
            SchemaErrorCode::DuplicateName => "MOL_SCHEMA_DUPLICATE_NAME",
            SchemaErrorCode::DuplicateField => "MOL_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::UnknownType => "MOL_SCHEMA_UNKNOWN_TYPE",
            SchemaErrorCode::NotFixedLength => "MOL_SCHEMA_NOT_FIXED",
            SchemaErrorCode::InvalidDeclaration => "MOL_SCHEMA_INVALID_DECLARATION",
            SchemaErrorCode::CircularDependency => "MOL_SCHEMA_CIRCULAR_DEPENDENCY",
            SchemaErrorCode::IoError => "MOL_SCHEMA_IO_ERROR",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with optional source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    location: Option<Location>,
    file: Option<PathBuf>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            file: None,
        }
    }

    /// Schema text does not match the grammar
    pub fn parse(location: Location, message: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::ParseError, message).at(location)
    }

    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateName,
            format!("Duplicate name: {}", name),
        )
    }

    pub fn duplicate_field(declaration: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::DuplicateField,
            format!("Duplicate field name: {} in {}", field, declaration),
        )
    }

    pub fn unknown_type(declaration: &str, type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::UnknownType,
            format!("{}: cannot find type {}", declaration, type_name),
        )
    }

    pub fn not_fixed(declaration: &str, type_name: &str) -> Self {
        Self::new(
            SchemaErrorCode::NotFixedLength,
            format!(
                "{}: type must be fixed length, but {} is not",
                declaration, type_name
            ),
        )
    }

    pub fn invalid_declaration(declaration: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::InvalidDeclaration,
            format!("{}: {}", declaration, reason),
        )
    }

    /// `cycle` lists the names along the cycle, first name repeated at the end
    pub fn circular_dependency(cycle: &[&str]) -> Self {
        Self::new(
            SchemaErrorCode::CircularDependency,
            format!("circular dependency: {}", cycle.join(" -> ")),
        )
    }

    pub fn io_error(path: &Path, reason: impl fmt::Display) -> Self {
        Self::new(
            SchemaErrorCode::IoError,
            format!("failed to read schema file: {}", reason),
        )
        .in_file(path)
    }

    /// Attach a source position
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attach the file the error came from, unless one is already set
    pub fn in_file(mut self, path: &Path) -> Self {
        if self.file.is_none() {
            self.file = Some(path.to_path_buf());
        }
        self
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        match (&self.file, self.location) {
            (Some(file), Some(loc)) => write!(f, " ({}:{})", file.display(), loc),
            (Some(file), None) => write!(f, " ({})", file.display()),
            (None, Some(loc)) => write!(f, " (at {})", loc),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

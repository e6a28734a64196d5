//! Schema subsystem: molecule schema text to a validated schema model
//!
//! # Pipeline
//!
//! 1. [`Lexer`](lexer::Lexer) splits text into located tokens
//! 2. [`parse`] builds declarations (syntax only)
//! 3. [`SchemaLoader`] merges files and resolves `import`s
//! 4. [`SchemaValidator`] enforces naming, reference and fixed-size rules
//!
//! Every failure is a hard error; there are no warnings and no partially
//! valid schemas.

mod errors;
pub mod lexer;
mod loader;
mod parser;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use loader::{SchemaLoader, SCHEMA_EXTENSION};
pub use parser::{parse, parse_schema, Import, SchemaFile};
pub use types::{DeclKind, Declaration, FieldDecl, Location, Schema, UnionItem, BYTE};
pub use validator::SchemaValidator;

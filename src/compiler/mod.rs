//! Codec compiler
//!
//! Turns a validated [`Schema`] into a [`CodecTable`]. Every declaration is
//! resolved post-order (dependencies first) and memoized by name, so the
//! total work is linear in the number of declarations.
//!
//! Compilation validates first; an invalid schema yields no table at all.
//!
//! ```ignore
//! use molecule_codec::compiler::Compiler;
//!
//! let table = Compiler::new().compile_str("vector Bytes <byte>;")?;
//! let bytes = table.codec("Bytes")?;
//! ```

mod blockchain;
mod errors;
mod resolver;
mod table;

use std::collections::HashMap;
use std::path::Path;

pub use blockchain::{blockchain, BLOCKCHAIN_SCHEMA};
pub use errors::{CompileError, CompileResult};
pub use table::CodecTable;

use crate::codec::Codec;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{parse_schema, Schema, SchemaLoader, SchemaValidator};
use resolver::Resolver;

/// Compiler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Compile `array UintN [byte; N/8]` (and `UintNBE`) to numeric codecs
    pub numeric_aliases: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            numeric_aliases: true,
        }
    }
}

/// Schema to codec table compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
    refs: HashMap<String, Codec>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            options,
            refs: HashMap::new(),
        }
    }

    /// Supplies a codec for `name`.
    ///
    /// The codec satisfies references to a type the schema does not
    /// declare, and replaces the declaration if it does.
    pub fn with_ref(mut self, name: impl Into<String>, codec: Codec) -> Self {
        self.refs.insert(name.into(), codec);
        self
    }

    /// Validates and compiles a schema.
    ///
    /// # Errors
    ///
    /// `CompileError::Schema` for any validation failure, `CompileError::Codec`
    /// if a declaration cannot be built (e.g. a mis-sized numeric alias).
    pub fn compile(&self, schema: &Schema) -> CompileResult<CodecTable> {
        let validator = self
            .refs
            .iter()
            .fold(SchemaValidator::new(schema), |v, (name, codec)| {
                v.with_external(name.clone(), codec.is_fixed())
            });
        if let Err(e) = validator.validate() {
            let message = e.to_string();
            log_event_with_fields(Event::SchemaRejected, &[("error", message.as_str())]);
            return Err(e.into());
        }
        let count = schema.len().to_string();
        log_event_with_fields(Event::SchemaValidated, &[("declarations", count.as_str())]);

        let mut resolver = Resolver::new(schema, self.options, &self.refs);
        let mut entries = Vec::with_capacity(schema.len());
        for name in schema.names() {
            entries.push((name.to_string(), resolver.resolve(name)?));
        }

        let built = resolver.builds.to_string();
        log_event_with_fields(
            Event::CodecsCompiled,
            &[("types", count.as_str()), ("built", built.as_str())],
        );
        Ok(CodecTable::from_entries(entries))
    }

    /// Parses and compiles self-contained schema text
    pub fn compile_str(&self, text: &str) -> CompileResult<CodecTable> {
        let schema = parse_schema(text)?;
        log_event_with_fields(Event::SchemaParsed, &[("bytes", text.len().to_string().as_str())]);
        self.compile(&schema)
    }

    /// Loads a schema file with its imports and compiles it
    pub fn compile_file(&self, path: &Path) -> CompileResult<CodecTable> {
        let schema = SchemaLoader::load(path)?;
        self.compile(&schema)
    }
}

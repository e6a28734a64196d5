//! molecule-codec - schema-driven codecs for the molecule binary format
//!
//! - `schema`: parse, load and validate molecule schema text
//! - `compiler`: turn a validated schema into a table of codecs
//! - `codec`: pack, unpack and verify buffers
//! - `observability`: structured JSON logging
//! - `cli`: the `molc` command line tool

pub mod cli;
pub mod codec;
pub mod compiler;
pub mod observability;
pub mod schema;

pub use codec::{Codec, CodecError, CodecResult, Endian, Uint, UnpackOptions, Value};
pub use compiler::{
    blockchain, CodecTable, CompileError, CompileResult, Compiler, CompilerOptions,
    BLOCKCHAIN_SCHEMA,
};
pub use schema::{Schema, SchemaError, SchemaLoader};

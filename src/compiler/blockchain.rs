//! Bundled CKB blockchain schema
//!
//! The transaction, block and witness types downstream SDKs share. Encodings
//! produced from this table are the conformance layouts, so the text must not
//! drift from `schemas/blockchain.mol`.

use super::{CodecTable, CompileResult, Compiler};

/// Schema text of the bundled blockchain types
pub const BLOCKCHAIN_SCHEMA: &str = include_str!("../../schemas/blockchain.mol");

/// Compiles the bundled blockchain schema with default options
///
/// `Uint32`, `Uint64` and `Uint128` become little-endian numeric codecs;
/// `hash_type` and `dep_type` are plain bytes.
pub fn blockchain() -> CompileResult<CodecTable> {
    Compiler::new().compile_str(BLOCKCHAIN_SCHEMA)
}

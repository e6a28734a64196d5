//! Shared fixtures for molecule-codec integration tests
//!
//! The bundled blockchain schema is the golden layout used by downstream
//! SDKs; its encodings must match bit for bit.

#![allow(dead_code)]

use molecule_codec::{CodecTable, Compiler, Value, BLOCKCHAIN_SCHEMA};

/// Appended to the bundled schema to cover union layouts
pub const PAYLOAD_SCHEMA: &str = "
/* Four variants; BytesVec sits at position 2 */
union Payload {
    Byte32,
    Bytes,
    BytesVec,
    Uint32,
}
";

/// The bundled blockchain schema plus `Payload`
pub fn schema_text() -> String {
    format!("{}{}", BLOCKCHAIN_SCHEMA, PAYLOAD_SCHEMA)
}

pub fn blockchain() -> CodecTable {
    Compiler::new()
        .compile_str(&schema_text())
        .expect("blockchain schema compiles")
}

pub fn hex(s: &str) -> Vec<u8> {
    hex::decode(s.replace(' ', "")).expect("valid hex fixture")
}

pub fn out_point(fill: u8, index: u32) -> Value {
    Value::record([
        ("tx_hash", Value::bytes(vec![fill; 32])),
        ("index", Value::uint(index)),
    ])
}

pub fn script(args: &[u8]) -> Value {
    Value::record([
        ("code_hash", Value::bytes(vec![0x11; 32])),
        ("hash_type", Value::Byte(1)),
        ("args", Value::bytes(args.to_vec())),
    ])
}

pub fn sample_transaction() -> Value {
    let raw = Value::record([
        ("version", Value::uint(0u32)),
        (
            "cell_deps",
            Value::list([Value::record([
                ("out_point", out_point(0xaa, 0)),
                ("dep_type", Value::Byte(1)),
            ])]),
        ),
        ("header_deps", Value::list([Value::bytes(vec![0x22; 32])])),
        (
            "inputs",
            Value::list([
                Value::record([
                    ("since", Value::uint(0u64)),
                    ("previous_output", out_point(0xbb, 1)),
                ]),
                Value::record([
                    ("since", Value::uint(0x2000_0000_0000_0064u64)),
                    ("previous_output", out_point(0xcc, 7)),
                ]),
            ]),
        ),
        (
            "outputs",
            Value::list([
                Value::record([
                    ("capacity", Value::uint(61_0000_0000u64)),
                    ("lock", script(&[0x01, 0x02, 0x03])),
                    ("type_", Value::none()),
                ]),
                Value::record([
                    ("capacity", Value::uint(100_0000_0000u64)),
                    ("lock", script(&[])),
                    ("type_", Value::some(script(&[0xff]))),
                ]),
            ]),
        ),
        (
            "outputs_data",
            Value::list([Value::bytes(Vec::new()), Value::bytes(vec![0xde, 0xad])]),
        ),
    ]);
    Value::record([
        ("raw", raw),
        ("witnesses", Value::list([Value::bytes(vec![0x55; 65])])),
    ])
}

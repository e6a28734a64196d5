//! Property-Based Round-Trip Tests
//!
//! For generated values `v` of every codec kind, `unpack(pack(v)) == v`.
//! For arbitrary bytes, `unpack` and `verify` agree, and anything that
//! unpacks re-packs to the same bytes.

mod common;

use common::blockchain;
use molecule_codec::codec::number::UINT_WIDTHS;
use molecule_codec::{Codec, Endian, Uint, UnpackOptions, Value};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_bytes(max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..max)
}

fn arb_out_point() -> impl Strategy<Value = Value> {
    (prop::array::uniform32(any::<u8>()), any::<u32>()).prop_map(|(hash, index)| {
        Value::record([
            ("tx_hash", Value::bytes(hash.to_vec())),
            ("index", Value::uint(index)),
        ])
    })
}

fn arb_script() -> impl Strategy<Value = Value> {
    (prop::array::uniform32(any::<u8>()), any::<u8>(), arb_bytes(48)).prop_map(
        |(code_hash, hash_type, args)| {
            Value::record([
                ("code_hash", Value::bytes(code_hash.to_vec())),
                ("hash_type", Value::Byte(hash_type)),
                ("args", Value::bytes(args)),
            ])
        },
    )
}

fn arb_bytes_opt() -> impl Strategy<Value = Value> {
    prop::option::of(arb_bytes(32)).prop_map(|b| match b {
        Some(b) => Value::some(Value::bytes(b)),
        None => Value::none(),
    })
}

fn arb_cell_output() -> impl Strategy<Value = Value> {
    (any::<u64>(), arb_script(), prop::option::of(arb_script())).prop_map(
        |(capacity, lock, type_)| {
            Value::record([
                ("capacity", Value::uint(capacity)),
                ("lock", lock),
                ("type_", type_.map(Value::some).unwrap_or_else(Value::none)),
            ])
        },
    )
}

fn arb_payload() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::array::uniform32(any::<u8>())
            .prop_map(|h| Value::union("Byte32", Value::bytes(h.to_vec()))),
        arb_bytes(32).prop_map(|b| Value::union("Bytes", Value::bytes(b))),
        prop::collection::vec(arb_bytes(8), 0..4).prop_map(|items| {
            Value::union("BytesVec", Value::list(items.into_iter().map(Value::bytes)))
        }),
        any::<u32>().prop_map(|n| Value::union("Uint32", Value::uint(n))),
    ]
}

/// A width, an endianness and a value that fits the width
fn arb_uint() -> impl Strategy<Value = (usize, Endian, Vec<u8>)> {
    (
        prop::sample::select(UINT_WIDTHS.to_vec()),
        prop_oneof![Just(Endian::Little), Just(Endian::Big)],
    )
        .prop_flat_map(|(width, endian)| {
            prop::collection::vec(any::<u8>(), width).prop_map(move |le| (width, endian, le))
        })
}

fn assert_round_trip(codec: &Codec, value: &Value) -> Result<(), TestCaseError> {
    let bytes = codec.pack(value).map_err(|e| TestCaseError::fail(e.to_string()))?;
    if let Some(len) = codec.byte_length() {
        prop_assert_eq!(bytes.len(), len);
    }
    prop_assert!(codec.verify(&bytes, UnpackOptions::strict()).is_ok());
    let decoded = codec.unpack(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&decoded, value);
    Ok(())
}

// =============================================================================
// Round Trips
// =============================================================================

proptest! {
    #[test]
    fn prop_uint_round_trip((width, endian, le) in arb_uint()) {
        let codec = Codec::uint(width, endian).unwrap();
        let value = Value::Uint(Uint::from_le_bytes(&le));
        let bytes = codec.pack(&value).unwrap();
        match endian {
            Endian::Little => {
                prop_assert_eq!(&bytes, &le);
            }
            Endian::Big => {
                let mut be = le.clone();
                be.reverse();
                prop_assert_eq!(&bytes, &be);
            }
        }
        prop_assert_eq!(codec.unpack(&bytes).unwrap(), value);
    }

    #[test]
    fn prop_uint_matches_native(n in any::<u64>()) {
        let codec = Codec::uint(8, Endian::Little).unwrap();
        let bytes = codec.pack(&Value::uint(n)).unwrap();
        prop_assert_eq!(bytes, n.to_le_bytes().to_vec());
    }

    #[test]
    fn prop_out_point_round_trip(value in arb_out_point()) {
        let table = blockchain();
        assert_round_trip(table.codec("OutPoint").unwrap(), &value)?;
    }

    #[test]
    fn prop_fixvec_length(items in prop::collection::vec(arb_out_point(), 0..8)) {
        let table = blockchain();
        let codec = Codec::vector(table.codec("OutPoint").unwrap().clone()).unwrap();
        let n = items.len();
        let value = Value::list(items);
        let bytes = codec.pack(&value).unwrap();
        prop_assert_eq!(bytes.len(), 4 + n * 36);
        prop_assert_eq!(codec.unpack(&bytes).unwrap(), value);
    }

    #[test]
    fn prop_cell_outputs_round_trip(outputs in prop::collection::vec(arb_cell_output(), 0..5)) {
        let table = blockchain();
        assert_round_trip(table.codec("CellOutputVec").unwrap(), &Value::list(outputs))?;
    }

    #[test]
    fn prop_witness_args_round_trip(
        lock in arb_bytes_opt(),
        input_type in arb_bytes_opt(),
        output_type in arb_bytes_opt(),
    ) {
        let table = blockchain();
        let value = Value::record([
            ("lock", lock),
            ("input_type", input_type),
            ("output_type", output_type),
        ]);
        assert_round_trip(table.codec("WitnessArgs").unwrap(), &value)?;
    }

    #[test]
    fn prop_union_round_trip(value in arb_payload()) {
        let table = blockchain();
        assert_round_trip(table.codec("Payload").unwrap(), &value)?;
    }

    #[test]
    fn prop_generic_list_codecs(bytes in arb_bytes(16)) {
        let items = Value::list(bytes.iter().map(|&b| Value::Byte(b)));
        let fixvec = Codec::vector(Codec::byte()).unwrap();
        assert_round_trip(&fixvec, &items)?;

        let dynvec = Codec::dynvec(fixvec.clone());
        assert_round_trip(&dynvec, &Value::list([items.clone(), Value::list([])]))?;

        let option = Codec::option(fixvec).unwrap();
        assert_round_trip(&option, &Value::some(items))?;
    }
}

// =============================================================================
// Arbitrary Input
// =============================================================================

proptest! {
    #[test]
    fn prop_unpack_and_verify_agree(buf in arb_bytes(64), name in prop::sample::select(vec![
        "Bytes", "BytesVec", "BytesOpt", "Script", "WitnessArgs", "Payload", "OutPoint",
    ])) {
        let table = blockchain();
        let codec = table.codec(name).unwrap();
        let unpacked = codec.unpack(&buf);
        let verified = codec.verify(&buf, UnpackOptions::strict());
        prop_assert_eq!(unpacked.is_ok(), verified.is_ok());
        if let Ok(value) = unpacked {
            prop_assert_eq!(codec.pack(&value).unwrap(), buf);
        }
    }

    #[test]
    fn prop_truncated_table_rejected(script in arb_script(), cut in 1usize..16) {
        let table = blockchain();
        let codec = table.codec("Script").unwrap();
        let bytes = codec.pack(&script).unwrap();
        let truncated = &bytes[..bytes.len() - cut];
        prop_assert!(codec.unpack(truncated).is_err());
        prop_assert!(codec.verify(truncated, UnpackOptions::strict()).is_err());
    }
}

//! Variable-size layouts: fixvec, dynvec, table, option and union
//!
//! | Layout  | Encoding                                              |
//! |---------|-------------------------------------------------------|
//! | fixvec  | `item_count: u32 LE` then `item_count` fixed items    |
//! | dynvec  | offset table, one entry per item                      |
//! | table   | offset table, one entry per declared field            |
//! | option  | empty when absent, the item's bytes when present      |
//! | union   | `variant_id: u32 LE` then the variant's bytes         |

use super::errors::{CodecError, CodecErrorKind, CodecResult, TrackPath};
use super::fixed::{record_values, Field};
use super::offset_table::{pack_offset_table, to_u32, ItemCount, OffsetTable, HEADER_WORD};
use super::value::Value;
use super::{Codec, UnpackOptions};

// ==================
// Fixed vectors
// ==================

/// Validates a fixvec header and returns the item count
fn fixvec_count(buf: &[u8], item_size: usize) -> CodecResult<usize> {
    if buf.len() < HEADER_WORD {
        return Err(CodecError::too_short(HEADER_WORD, buf.len()));
    }
    let mut word = [0u8; HEADER_WORD];
    word.copy_from_slice(&buf[..HEADER_WORD]);
    let count = u32::from_le_bytes(word) as usize;
    let body = count
        .checked_mul(item_size)
        .and_then(|n| n.checked_add(HEADER_WORD))
        .ok_or_else(|| CodecError::new(CodecErrorKind::ItemCountOverflow { count, item_size }))?;
    if body != buf.len() {
        return Err(CodecError::length_mismatch(body, buf.len()));
    }
    Ok(count)
}

fn write_count(out: &mut Vec<u8>, count: usize) -> CodecResult<()> {
    out.extend_from_slice(&to_u32(count)?.to_le_bytes());
    Ok(())
}

pub(crate) fn pack_fixvec(item: &Codec, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    let items = expect_list(value)?;
    write_count(out, items.len())?;
    for (i, v) in items.iter().enumerate() {
        item.pack_into(v, out).at_index(i)?;
    }
    Ok(())
}

pub(crate) fn unpack_fixvec(
    item: &Codec,
    item_size: usize,
    buf: &[u8],
    options: UnpackOptions,
) -> CodecResult<Value> {
    let count = fixvec_count(buf, item_size)?;
    let body = &buf[HEADER_WORD..];
    let items = (0..count)
        .map(|i| {
            item.unpack_in(&body[i * item_size..(i + 1) * item_size], options)
                .at_index(i)
        })
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Value::List(items))
}

pub(crate) fn verify_fixvec(item_size: usize, buf: &[u8]) -> CodecResult<()> {
    fixvec_count(buf, item_size).map(|_| ())
}

pub(crate) fn pack_raw_bytes(value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    match value {
        Value::Bytes(bytes) => {
            write_count(out, bytes.len())?;
            out.extend_from_slice(bytes);
            Ok(())
        }
        other => Err(CodecError::unexpected_value("bytes", other.kind_name())),
    }
}

pub(crate) fn unpack_raw_bytes(buf: &[u8]) -> CodecResult<Value> {
    fixvec_count(buf, 1)?;
    Ok(Value::Bytes(buf[HEADER_WORD..].to_vec()))
}

// ==================
// Dynamic vectors
// ==================

pub(crate) fn pack_dynvec(item: &Codec, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    let items = expect_list(value)?;
    pack_offset_table(out, items.len(), |out, i| {
        item.pack_into(&items[i], out).at_index(i)
    })
}

pub(crate) fn unpack_dynvec(item: &Codec, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
    let table = OffsetTable::parse(buf, ItemCount::Any)?;
    let items = table
        .items()
        .enumerate()
        .map(|(i, slice)| item.unpack_in(slice, options).at_index(i))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(Value::List(items))
}

pub(crate) fn verify_dynvec(item: &Codec, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
    let table = OffsetTable::parse(buf, ItemCount::Any)?;
    for (i, slice) in table.items().enumerate() {
        item.verify_in(slice, options).at_index(i)?;
    }
    Ok(())
}

fn expect_list(value: &Value) -> CodecResult<&[Value]> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(CodecError::unexpected_value("list", other.kind_name())),
    }
}

// ==================
// Tables
// ==================

/// Named fields of any size behind an offset table
#[derive(Debug)]
pub(crate) struct TableLayout {
    pub fields: Vec<Field>,
}

impl TableLayout {
    pub fn item_count(&self, options: UnpackOptions) -> ItemCount {
        ItemCount::Declared {
            declared: self.fields.len(),
            compatible: options.compatible,
        }
    }

    pub fn pack_into(&self, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
        let values = record_values(&self.fields, value)?;
        pack_offset_table(out, self.fields.len(), |out, i| {
            let field = &self.fields[i];
            match values[i] {
                Some(v) => field.codec.pack_into(v, out).at_field(&field.name),
                // Missing option: encoded as absent
                None => Ok(()),
            }
        })
    }

    /// Decodes the declared fields; trailing fields (compatible mode) are ignored
    pub fn unpack(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        let table = OffsetTable::parse(buf, self.item_count(options))?;
        let entries = self
            .fields
            .iter()
            .zip(table.items())
            .map(|(field, slice)| {
                field
                    .codec
                    .unpack_in(slice, options)
                    .at_field(&field.name)
                    .map(|v| (field.name.clone(), v))
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Value::Record(entries))
    }

    pub fn verify(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
        let table = OffsetTable::parse(buf, self.item_count(options))?;
        for (field, slice) in self.fields.iter().zip(table.items()) {
            field.codec.verify_in(slice, options).at_field(&field.name)?;
        }
        Ok(())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

// ==================
// Options
// ==================

pub(crate) fn pack_option(item: &Codec, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    match value {
        Value::Opt(None) => Ok(()),
        Value::Opt(Some(inner)) => item.pack_into(inner, out).at_option(),
        other => Err(CodecError::unexpected_value("option", other.kind_name())),
    }
}

pub(crate) fn unpack_option(item: &Codec, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
    if buf.is_empty() {
        return Ok(Value::Opt(None));
    }
    let inner = item.unpack_in(buf, options).at_option()?;
    Ok(Value::some(inner))
}

pub(crate) fn verify_option(item: &Codec, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
    if buf.is_empty() {
        return Ok(());
    }
    item.verify_in(buf, options).at_option()
}

// ==================
// Unions
// ==================

#[derive(Debug)]
pub(crate) struct Variant {
    pub name: String,
    pub id: u32,
    pub codec: Codec,
}

/// Tagged choice between variants
#[derive(Debug)]
pub(crate) struct UnionLayout {
    pub variants: Vec<Variant>,
}

impl UnionLayout {
    pub fn new(variants: Vec<Variant>) -> CodecResult<Self> {
        for (i, variant) in variants.iter().enumerate() {
            for earlier in &variants[..i] {
                if earlier.name == variant.name {
                    return Err(CodecError::invalid_definition(format!(
                        "duplicate union variant '{}'",
                        variant.name
                    )));
                }
                if earlier.id == variant.id {
                    return Err(CodecError::invalid_definition(format!(
                        "duplicate union id {} ('{}' and '{}')",
                        variant.id, earlier.name, variant.name
                    )));
                }
            }
        }
        Ok(Self { variants })
    }

    pub fn by_name(&self, name: &str) -> CodecResult<&Variant> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| CodecError::new(CodecErrorKind::UnknownUnionVariant(name.to_string())))
    }

    /// Splits the tag and resolves its variant
    fn split<'b>(&self, buf: &'b [u8]) -> CodecResult<(&Variant, &'b [u8])> {
        if buf.len() < HEADER_WORD {
            return Err(CodecError::too_short(HEADER_WORD, buf.len()));
        }
        let mut word = [0u8; HEADER_WORD];
        word.copy_from_slice(&buf[..HEADER_WORD]);
        let id = u32::from_le_bytes(word);
        let variant = self
            .variants
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| CodecError::new(CodecErrorKind::UnknownUnionId(id)))?;
        Ok((variant, &buf[HEADER_WORD..]))
    }

    pub fn pack_into(&self, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
        let (name, inner) = match value {
            Value::Union { variant, value } => (variant, value),
            other => return Err(CodecError::unexpected_value("union", other.kind_name())),
        };
        let variant = self.by_name(name)?;
        out.extend_from_slice(&variant.id.to_le_bytes());
        variant.codec.pack_into(inner, out).at_variant(&variant.name)
    }

    pub fn unpack(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        let (variant, body) = self.split(buf)?;
        let inner = variant
            .codec
            .unpack_in(body, options)
            .at_variant(&variant.name)?;
        Ok(Value::union(variant.name.clone(), inner))
    }

    pub fn verify(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
        let (variant, body) = self.split(buf)?;
        variant.codec.verify_in(body, options).at_variant(&variant.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::errors::CodecErrorCode;

    #[test]
    fn test_fixvec_header() {
        assert_eq!(fixvec_count(&[2, 0, 0, 0, 1, 2], 1).unwrap(), 2);
        let err = fixvec_count(&[2, 0, 0, 0, 1], 1).unwrap_err();
        assert!(matches!(
            err.kind(),
            CodecErrorKind::LengthMismatch { expected: 6, actual: 5 }
        ));
        assert!(fixvec_count(&[0, 0, 0], 1).is_err());
    }

    #[test]
    fn test_fixvec_count_overflow_is_rejected() {
        let err = fixvec_count(&[0xff, 0xff, 0xff, 0xff], usize::MAX).unwrap_err();
        assert!(matches!(err.kind(), CodecErrorKind::ItemCountOverflow { .. }));
    }

    #[test]
    fn test_raw_bytes() {
        let mut out = Vec::new();
        pack_raw_bytes(&Value::bytes(vec![0xaa, 0xbb]), &mut out).unwrap();
        assert_eq!(out, vec![2, 0, 0, 0, 0xaa, 0xbb]);
        assert_eq!(unpack_raw_bytes(&out).unwrap(), Value::bytes(vec![0xaa, 0xbb]));
    }

    #[test]
    fn test_option_rejects_non_option_value() {
        let mut out = Vec::new();
        let err = pack_option(&Codec::byte(), &Value::Byte(1), &mut out).unwrap_err();
        assert_eq!(err.code(), CodecErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_option_path_is_tracked() {
        let err = unpack_option(&Codec::byte(), &[1, 2], UnpackOptions::default()).unwrap_err();
        assert_eq!(err.path(), "input?");
    }

    #[test]
    fn test_union_rejects_duplicates() {
        let err = UnionLayout::new(vec![
            Variant { name: "a".into(), id: 0, codec: Codec::byte() },
            Variant { name: "b".into(), id: 0, codec: Codec::byte() },
        ])
        .unwrap_err();
        assert_eq!(err.code(), CodecErrorCode::InvalidDefinition);

        let err = UnionLayout::new(vec![
            Variant { name: "a".into(), id: 0, codec: Codec::byte() },
            Variant { name: "a".into(), id: 1, codec: Codec::byte() },
        ])
        .unwrap_err();
        assert_eq!(err.code(), CodecErrorCode::InvalidDefinition);
    }

    #[test]
    fn test_union_unknown_tag() {
        let layout = UnionLayout::new(vec![Variant {
            name: "a".into(),
            id: 0,
            codec: Codec::byte(),
        }])
        .unwrap();
        let err = layout
            .unpack(&[1, 0, 0, 0, 0xff], UnpackOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), &CodecErrorKind::UnknownUnionId(1));
        assert!(layout.unpack(&[0, 0, 0], UnpackOptions::default()).is_err());
    }
}

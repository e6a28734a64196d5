//! Fixed-size layouts: byte, fixed bytes, array and struct
//!
//! A fixed codec always encodes to exactly `byte_length` bytes. Arrays and
//! structs are plain concatenations of their (fixed) elements with no header
//! and no padding.

use super::errors::{CodecError, CodecErrorKind, CodecResult, TrackPath};
use super::value::Value;
use super::{Codec, UnpackOptions};

/// A named member of a struct or table
#[derive(Debug, Clone)]
pub(crate) struct Field {
    pub name: String,
    pub codec: Codec,
}

/// Collects fields from `(name, codec)` pairs, rejecting duplicate names
pub(crate) fn collect_fields<I, S>(fields: I) -> CodecResult<Vec<Field>>
where
    I: IntoIterator<Item = (S, Codec)>,
    S: Into<String>,
{
    let mut out: Vec<Field> = Vec::new();
    for (name, codec) in fields {
        let name = name.into();
        if out.iter().any(|f| f.name == name) {
            return Err(CodecError::invalid_definition(format!(
                "duplicate field name '{}'",
                name
            )));
        }
        out.push(Field { name, codec });
    }
    Ok(out)
}

/// Matches a record value against declared fields.
///
/// Returns one entry per declared field, in declaration order. A missing
/// field is only tolerated when its codec is an option, and comes back as
/// `None` (encoded as absent).
pub(crate) fn record_values<'v>(
    fields: &[Field],
    value: &'v Value,
) -> CodecResult<Vec<Option<&'v Value>>> {
    let entries = match value {
        Value::Record(entries) => entries,
        other => return Err(CodecError::unexpected_value("record", other.kind_name())),
    };

    let mut matched: Vec<Option<&'v Value>> = vec![None; fields.len()];
    for (name, v) in entries {
        let index = fields
            .iter()
            .position(|f| &f.name == name)
            .ok_or_else(|| CodecError::new(CodecErrorKind::UnexpectedField(name.clone())))?;
        if matched[index].is_some() {
            return Err(CodecError::new(CodecErrorKind::UnexpectedField(name.clone())));
        }
        matched[index] = Some(v);
    }

    for (field, slot) in fields.iter().zip(&matched) {
        if slot.is_none() && !field.codec.is_option() {
            return Err(CodecError::new(CodecErrorKind::MissingField(
                field.name.clone(),
            )));
        }
    }
    Ok(matched)
}

pub(crate) fn pack_byte(value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    match value {
        Value::Byte(b) => {
            out.push(*b);
            Ok(())
        }
        other => Err(CodecError::unexpected_value("byte", other.kind_name())),
    }
}

pub(crate) fn unpack_byte(buf: &[u8]) -> CodecResult<Value> {
    match buf {
        [b] => Ok(Value::Byte(*b)),
        _ => Err(CodecError::length_mismatch(1, buf.len())),
    }
}

pub(crate) fn pack_fixed_bytes(len: usize, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
    match value {
        Value::Bytes(bytes) if bytes.len() == len => {
            out.extend_from_slice(bytes);
            Ok(())
        }
        Value::Bytes(bytes) => Err(CodecError::length_mismatch(len, bytes.len())),
        other => Err(CodecError::unexpected_value("bytes", other.kind_name())),
    }
}

pub(crate) fn unpack_fixed_bytes(len: usize, buf: &[u8]) -> CodecResult<Value> {
    check_length(len, buf)?;
    Ok(Value::Bytes(buf.to_vec()))
}

pub(crate) fn check_length(expected: usize, buf: &[u8]) -> CodecResult<()> {
    if buf.len() == expected {
        Ok(())
    } else {
        Err(CodecError::length_mismatch(expected, buf.len()))
    }
}

/// `count` copies of a fixed item
#[derive(Debug)]
pub(crate) struct ArrayLayout {
    pub item: Codec,
    pub count: usize,
    pub item_size: usize,
}

impl ArrayLayout {
    pub fn new(item: Codec, count: usize) -> CodecResult<Self> {
        let item_size = item.byte_length().ok_or_else(|| {
            CodecError::invalid_definition(format!(
                "array item must be fixed-size, got {}",
                item.kind_name()
            ))
        })?;
        item_size.checked_mul(count).ok_or_else(|| {
            CodecError::new(CodecErrorKind::ItemCountOverflow { count, item_size })
        })?;
        Ok(Self {
            item,
            count,
            item_size,
        })
    }

    pub fn byte_length(&self) -> usize {
        self.item_size * self.count
    }

    pub fn pack_into(&self, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(CodecError::unexpected_value("list", other.kind_name())),
        };
        if items.len() != self.count {
            return Err(CodecError::new(CodecErrorKind::ItemCountMismatch {
                expected: self.count,
                actual: items.len(),
            }));
        }
        for (i, item) in items.iter().enumerate() {
            self.item.pack_into(item, out).at_index(i)?;
        }
        Ok(())
    }

    pub fn unpack(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        check_length(self.byte_length(), buf)?;
        let size = self.item_size;
        let items = (0..self.count)
            .map(|i| {
                self.item
                    .unpack_in(&buf[i * size..(i + 1) * size], options)
                    .at_index(i)
            })
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Value::List(items))
    }
}

/// Named fixed fields laid out back to back
#[derive(Debug)]
pub(crate) struct StructLayout {
    pub fields: Vec<Field>,
    /// Start offset of each field
    pub offsets: Vec<usize>,
    pub byte_length: usize,
}

impl StructLayout {
    pub fn new(fields: Vec<Field>) -> CodecResult<Self> {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut byte_length = 0usize;
        for field in &fields {
            let size = field.codec.byte_length().ok_or_else(|| {
                CodecError::invalid_definition(format!(
                    "struct field '{}' must be fixed-size, got {}",
                    field.name,
                    field.codec.kind_name()
                ))
            })?;
            offsets.push(byte_length);
            byte_length = byte_length.checked_add(size).ok_or_else(|| {
                CodecError::invalid_definition("struct size overflows usize")
            })?;
        }
        Ok(Self {
            fields,
            offsets,
            byte_length,
        })
    }

    pub fn pack_into(&self, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
        let values = record_values(&self.fields, value)?;
        for (field, v) in self.fields.iter().zip(values) {
            // Struct fields are fixed, so never options: record_values
            // has already rejected any missing field.
            if let Some(v) = v {
                field.codec.pack_into(v, out).at_field(&field.name)?;
            }
        }
        Ok(())
    }

    pub fn unpack(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        check_length(self.byte_length, buf)?;
        let mut entries = Vec::with_capacity(self.fields.len());
        for (i, field) in self.fields.iter().enumerate() {
            let end = self
                .offsets
                .get(i + 1)
                .copied()
                .unwrap_or(self.byte_length);
            let v = field
                .codec
                .unpack_in(&buf[self.offsets[i]..end], options)
                .at_field(&field.name)?;
            entries.push((field.name.clone(), v));
        }
        Ok(Value::Record(entries))
    }
}

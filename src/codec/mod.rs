//! Codec runtime
//!
//! A [`Codec`] packs a structured [`Value`] into molecule bytes and unpacks
//! bytes back into a value, rejecting anything that does not match the
//! layout exactly.
//!
//! Codecs are immutable, cheap to clone (shared behind an `Arc`) and safe to
//! use from many threads at once. Composite codecs are built from their
//! parts with the fallible constructors below, which reject definitions that
//! can never encode correctly (e.g. a variable-size array item).

pub mod errors;
pub mod number;
pub mod offset_table;
pub mod value;
pub mod view;

mod compound;
mod fixed;

use std::fmt;
use std::sync::Arc;

pub use errors::{CodecError, CodecErrorCode, CodecErrorKind, CodecResult, PathSegment};
pub use number::Endian;
pub use offset_table::{ItemCount, OffsetTable};
pub use value::{Uint, Value};
pub use view::{DynVecView, TableView};

use compound::{TableLayout, UnionLayout, Variant};
use fixed::{ArrayLayout, StructLayout};

/// Options for reading buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackOptions {
    /// Accept tables carrying more fields than declared; extras are ignored
    pub compatible: bool,
}

impl UnpackOptions {
    /// Strict reading: table field counts must match exactly
    pub fn strict() -> Self {
        Self { compatible: false }
    }

    /// Compatible reading: newer writers may append table fields
    pub fn compatible() -> Self {
        Self { compatible: true }
    }
}

#[derive(Debug)]
pub(crate) enum CodecKind {
    Byte,
    FixedBytes(usize),
    Uint { width: usize, endian: Endian },
    Array(ArrayLayout),
    Struct(StructLayout),
    FixVec { item: Codec, item_size: usize },
    /// `vector<byte>`, decoded as `Value::Bytes`
    RawBytes,
    DynVec(Codec),
    Table(TableLayout),
    Option(Codec),
    Union(UnionLayout),
}

/// A compiled encoder/decoder for one molecule type
#[derive(Clone)]
pub struct Codec {
    kind: Arc<CodecKind>,
}

impl Codec {
    fn from_kind(kind: CodecKind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    // ==================
    // Constructors
    // ==================

    /// A single byte
    pub fn byte() -> Self {
        Self::from_kind(CodecKind::Byte)
    }

    /// Exactly `len` opaque bytes, decoded as `Value::Bytes`
    pub fn fixed_bytes(len: usize) -> Self {
        Self::from_kind(CodecKind::FixedBytes(len))
    }

    /// An unsigned integer of `width` bytes
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` unless `width` is 1, 2, 4, 8, 16, 32 or 64.
    pub fn uint(width: usize, endian: Endian) -> CodecResult<Self> {
        number::check_width(width)?;
        Ok(Self::from_kind(CodecKind::Uint { width, endian }))
    }

    /// `count` fixed-size items
    pub fn array(item: Codec, count: usize) -> CodecResult<Self> {
        Ok(Self::from_kind(CodecKind::Array(ArrayLayout::new(item, count)?)))
    }

    /// Named fixed-size fields in order
    pub fn structure<I, S>(fields: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, Codec)>,
        S: Into<String>,
    {
        let fields = fixed::collect_fields(fields)?;
        Ok(Self::from_kind(CodecKind::Struct(StructLayout::new(fields)?)))
    }

    /// A vector, choosing fixvec for fixed items and dynvec otherwise
    pub fn vector(item: Codec) -> CodecResult<Self> {
        if item.is_fixed() {
            Self::fixvec(item)
        } else {
            Ok(Self::dynvec(item))
        }
    }

    /// A count-prefixed vector of fixed-size items
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` if the item is variable-size or zero-sized.
    pub fn fixvec(item: Codec) -> CodecResult<Self> {
        match item.byte_length() {
            Some(0) => Err(CodecError::invalid_definition(
                "vector item must not be zero-sized",
            )),
            Some(item_size) => Ok(Self::from_kind(CodecKind::FixVec { item, item_size })),
            None => Err(CodecError::invalid_definition(format!(
                "fixvec item must be fixed-size, got {}",
                item.kind_name()
            ))),
        }
    }

    /// `vector<byte>` with a `Value::Bytes` value
    pub fn bytes() -> Self {
        Self::from_kind(CodecKind::RawBytes)
    }

    /// An offset-table vector of items of any size
    pub fn dynvec(item: Codec) -> Self {
        Self::from_kind(CodecKind::DynVec(item))
    }

    /// Named fields of any size behind an offset table
    pub fn table<I, S>(fields: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, Codec)>,
        S: Into<String>,
    {
        let fields = fixed::collect_fields(fields)?;
        Ok(Self::from_kind(CodecKind::Table(TableLayout { fields })))
    }

    /// Zero or one item
    ///
    /// An absent option is the empty buffer, so the item must never encode
    /// to zero bytes.
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` if the item is itself an option or zero-sized.
    pub fn option(item: Codec) -> CodecResult<Self> {
        if item.is_option() {
            return Err(CodecError::invalid_definition(
                "option item must not be an option",
            ));
        }
        if item.byte_length() == Some(0) {
            return Err(CodecError::invalid_definition(
                "option item must not be zero-sized",
            ));
        }
        Ok(Self::from_kind(CodecKind::Option(item)))
    }

    /// A union whose variant ids are their positions
    pub fn union<I, S>(variants: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, Codec)>,
        S: Into<String>,
    {
        let mut with_ids = Vec::new();
        for (position, (name, codec)) in variants.into_iter().enumerate() {
            let id = offset_table::to_u32(position)?;
            with_ids.push((name, id, codec));
        }
        Self::union_with_ids(with_ids)
    }

    /// A union with explicit variant ids
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` for a repeated name or id.
    pub fn union_with_ids<I, S>(variants: I) -> CodecResult<Self>
    where
        I: IntoIterator<Item = (S, u32, Codec)>,
        S: Into<String>,
    {
        let variants = variants
            .into_iter()
            .map(|(name, id, codec)| Variant {
                name: name.into(),
                id,
                codec,
            })
            .collect();
        Ok(Self::from_kind(CodecKind::Union(UnionLayout::new(variants)?)))
    }

    // ==================
    // Introspection
    // ==================

    /// Encoded size for fixed codecs, `None` for variable-size ones
    pub fn byte_length(&self) -> Option<usize> {
        match &*self.kind {
            CodecKind::Byte => Some(1),
            CodecKind::FixedBytes(len) => Some(*len),
            CodecKind::Uint { width, .. } => Some(*width),
            CodecKind::Array(layout) => Some(layout.byte_length()),
            CodecKind::Struct(layout) => Some(layout.byte_length),
            CodecKind::FixVec { .. }
            | CodecKind::RawBytes
            | CodecKind::DynVec(_)
            | CodecKind::Table(_)
            | CodecKind::Option(_)
            | CodecKind::Union(_) => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.byte_length().is_some()
    }

    pub(crate) fn is_option(&self) -> bool {
        matches!(&*self.kind, CodecKind::Option(_))
    }

    /// Layout name: byte, bytes, uint, array, struct, fixvec, dynvec, table, option or union
    pub fn kind_name(&self) -> &'static str {
        match &*self.kind {
            CodecKind::Byte => "byte",
            CodecKind::FixedBytes(_) => "array",
            CodecKind::Uint { .. } => "uint",
            CodecKind::Array(_) => "array",
            CodecKind::Struct(_) => "struct",
            CodecKind::FixVec { .. } | CodecKind::RawBytes => "fixvec",
            CodecKind::DynVec(_) => "dynvec",
            CodecKind::Table(_) => "table",
            CodecKind::Option(_) => "option",
            CodecKind::Union(_) => "union",
        }
    }

    /// Field names for struct and table codecs, variant names for unions
    pub fn member_names(&self) -> Vec<&str> {
        match &*self.kind {
            CodecKind::Struct(layout) => layout.fields.iter().map(|f| f.name.as_str()).collect(),
            CodecKind::Table(layout) => layout.fields.iter().map(|f| f.name.as_str()).collect(),
            CodecKind::Union(layout) => layout.variants.iter().map(|v| v.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// True if both handles share the same compiled codec
    pub fn ptr_eq(&self, other: &Codec) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind)
    }

    // ==================
    // Pack / unpack
    // ==================

    /// Encodes `value`
    ///
    /// # Errors
    ///
    /// Any shape, range or length error, with the path to the offending element.
    pub fn pack(&self, value: &Value) -> CodecResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.byte_length().unwrap_or(0));
        self.pack_into(value, &mut out)?;
        Ok(out)
    }

    /// Decodes `buf` in strict mode
    pub fn unpack(&self, buf: &[u8]) -> CodecResult<Value> {
        self.unpack_in(buf, UnpackOptions::default())
    }

    /// Decodes `buf` with explicit options
    pub fn unpack_with(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        self.unpack_in(buf, options)
    }

    /// Validates `buf` without building a value
    pub fn verify(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
        self.verify_in(buf, options)
    }

    /// Lazy reader over a table buffer
    ///
    /// # Errors
    ///
    /// `InvalidDefinition` if this codec is not a table, or any header error.
    pub fn view_table<'a>(&'a self, buf: &'a [u8], options: UnpackOptions) -> CodecResult<TableView<'a>> {
        match &*self.kind {
            CodecKind::Table(layout) => TableView::new(layout, buf, options),
            _ => Err(CodecError::invalid_definition(format!(
                "cannot view {} as a table",
                self.kind_name()
            ))),
        }
    }

    /// Lazy reader over a dynvec buffer
    pub fn view_dynvec<'a>(&'a self, buf: &'a [u8], options: UnpackOptions) -> CodecResult<DynVecView<'a>> {
        match &*self.kind {
            CodecKind::DynVec(item) => DynVecView::new(item, buf, options),
            _ => Err(CodecError::invalid_definition(format!(
                "cannot view {} as a dynvec",
                self.kind_name()
            ))),
        }
    }

    pub(crate) fn pack_into(&self, value: &Value, out: &mut Vec<u8>) -> CodecResult<()> {
        match &*self.kind {
            CodecKind::Byte => fixed::pack_byte(value, out),
            CodecKind::FixedBytes(len) => fixed::pack_fixed_bytes(*len, value, out),
            CodecKind::Uint { width, endian } => number::pack_uint(value, *width, *endian, out),
            CodecKind::Array(layout) => layout.pack_into(value, out),
            CodecKind::Struct(layout) => layout.pack_into(value, out),
            CodecKind::FixVec { item, .. } => compound::pack_fixvec(item, value, out),
            CodecKind::RawBytes => compound::pack_raw_bytes(value, out),
            CodecKind::DynVec(item) => compound::pack_dynvec(item, value, out),
            CodecKind::Table(layout) => layout.pack_into(value, out),
            CodecKind::Option(item) => compound::pack_option(item, value, out),
            CodecKind::Union(layout) => layout.pack_into(value, out),
        }
    }

    pub(crate) fn unpack_in(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<Value> {
        match &*self.kind {
            CodecKind::Byte => fixed::unpack_byte(buf),
            CodecKind::FixedBytes(len) => fixed::unpack_fixed_bytes(*len, buf),
            CodecKind::Uint { width, endian } => number::unpack_uint(buf, *width, *endian),
            CodecKind::Array(layout) => layout.unpack(buf, options),
            CodecKind::Struct(layout) => layout.unpack(buf, options),
            CodecKind::FixVec { item, item_size } => {
                compound::unpack_fixvec(item, *item_size, buf, options)
            }
            CodecKind::RawBytes => compound::unpack_raw_bytes(buf),
            CodecKind::DynVec(item) => compound::unpack_dynvec(item, buf, options),
            CodecKind::Table(layout) => layout.unpack(buf, options),
            CodecKind::Option(item) => compound::unpack_option(item, buf, options),
            CodecKind::Union(layout) => layout.unpack(buf, options),
        }
    }

    pub(crate) fn verify_in(&self, buf: &[u8], options: UnpackOptions) -> CodecResult<()> {
        match &*self.kind {
            // Fixed layouts have no headers: the length is the whole check
            CodecKind::Byte
            | CodecKind::FixedBytes(_)
            | CodecKind::Uint { .. }
            | CodecKind::Array(_)
            | CodecKind::Struct(_) => {
                let expected = self.byte_length().unwrap_or(0);
                fixed::check_length(expected, buf)
            }
            CodecKind::FixVec { item_size, .. } => compound::verify_fixvec(*item_size, buf),
            CodecKind::RawBytes => compound::verify_fixvec(1, buf),
            CodecKind::DynVec(item) => compound::verify_dynvec(item, buf, options),
            CodecKind::Table(layout) => layout.verify(buf, options),
            CodecKind::Option(item) => compound::verify_option(item, buf, options),
            CodecKind::Union(layout) => layout.verify(buf, options),
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.byte_length() {
            Some(len) => write!(f, "Codec({}, {} bytes)", self.kind_name(), len),
            None => write!(f, "Codec({})", self.kind_name()),
        }
    }
}

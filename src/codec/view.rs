//! Lazy, borrowing readers over validated buffers
//!
//! Construction validates only the offset table header. Items are decoded
//! (and fully validated) on access, so reading one field of a large table
//! does not pay for the rest.

use super::compound::TableLayout;
use super::errors::{CodecError, CodecErrorKind, CodecResult, TrackPath};
use super::offset_table::{ItemCount, OffsetTable};
use super::value::Value;
use super::{Codec, UnpackOptions};

/// Field-by-field reader over a table buffer
#[derive(Debug)]
pub struct TableView<'a> {
    layout: &'a TableLayout,
    table: OffsetTable<'a>,
    options: UnpackOptions,
}

impl<'a> TableView<'a> {
    pub(crate) fn new(
        layout: &'a TableLayout,
        buf: &'a [u8],
        options: UnpackOptions,
    ) -> CodecResult<Self> {
        let table = OffsetTable::parse(buf, layout.item_count(options))?;
        Ok(Self {
            layout,
            table,
            options,
        })
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.layout.fields.len()
    }

    /// Fields present in the buffer beyond the declared ones (compatible mode)
    pub fn extra_field_count(&self) -> usize {
        self.table.len() - self.layout.fields.len()
    }

    /// Declared field names, in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.layout.fields.iter().map(|f| f.name.as_str())
    }

    /// Decodes the named field
    ///
    /// # Errors
    ///
    /// `UnexpectedField` if the table declares no such field, or any error
    /// from decoding the field's bytes.
    pub fn field(&self, name: &str) -> CodecResult<Value> {
        let index = self
            .layout
            .position(name)
            .ok_or_else(|| CodecError::new(CodecErrorKind::UnexpectedField(name.to_string())))?;
        self.field_at(index)
    }

    /// Decodes the field at a declared position
    pub fn field_at(&self, index: usize) -> CodecResult<Value> {
        let field = self.layout.fields.get(index).ok_or_else(|| {
            CodecError::new(CodecErrorKind::ItemCountMismatch {
                expected: self.layout.fields.len(),
                actual: index + 1,
            })
        })?;
        let slice = self.table.item(index).ok_or_else(|| {
            CodecError::new(CodecErrorKind::TooFewFields {
                expected: index + 1,
                actual: self.table.len(),
            })
        })?;
        field
            .codec
            .unpack_in(slice, self.options)
            .at_field(&field.name)
    }

    /// Raw bytes of field `index`, including undeclared trailing fields
    pub fn raw_field(&self, index: usize) -> Option<&'a [u8]> {
        self.table.item(index)
    }
}

/// Item-by-item reader over a dynvec buffer
#[derive(Debug)]
pub struct DynVecView<'a> {
    item: &'a Codec,
    table: OffsetTable<'a>,
    options: UnpackOptions,
}

impl<'a> DynVecView<'a> {
    pub(crate) fn new(item: &'a Codec, buf: &'a [u8], options: UnpackOptions) -> CodecResult<Self> {
        let table = OffsetTable::parse(buf, ItemCount::Any)?;
        Ok(Self {
            item,
            table,
            options,
        })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Decodes item `index`
    pub fn item(&self, index: usize) -> CodecResult<Value> {
        let slice = self.raw_item(index).ok_or_else(|| {
            CodecError::new(CodecErrorKind::ItemCountMismatch {
                expected: self.len(),
                actual: index + 1,
            })
        })?;
        self.item.unpack_in(slice, self.options).at_index(index)
    }

    pub fn raw_item(&self, index: usize) -> Option<&'a [u8]> {
        self.table.item(index)
    }

    /// Decodes every item in order
    pub fn iter(&self) -> impl Iterator<Item = CodecResult<Value>> + '_ {
        (0..self.len()).map(move |i| self.item(i))
    }
}

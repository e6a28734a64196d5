//! Offset-table layout shared by dynamic vectors and tables
//!
//! ```text
//! | total_length: u32 LE | offset_0 .. offset_{n-1}: u32 LE | item_0 | ... | item_{n-1} |
//! ```
//!
//! `total_length` covers the whole buffer including the header. Offsets are
//! measured from the start of the buffer. Item `i` spans
//! `offset_i .. offset_{i+1}`, the last item ends at `total_length`.
//! An empty table is exactly `04 00 00 00`.
//!
//! Validation order matters: the first offset is bounds-checked against the
//! total length before any further header word is read, so a malicious item
//! count can never drive reads past the buffer.

use super::errors::{CodecError, CodecErrorKind, CodecResult};

/// Size of one header word
pub const HEADER_WORD: usize = 4;

/// How many items the reader expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemCount {
    /// Dynamic vector: any count
    Any,
    /// Table: exactly `declared` items, or at least that many in compatible mode
    Declared { declared: usize, compatible: bool },
}

/// A validated offset table borrowing its buffer
///
/// Item slices are handed out without copying.
#[derive(Debug, Clone)]
pub struct OffsetTable<'a> {
    buf: &'a [u8],
    /// `len() + 1` entries; the last is the total length
    bounds: Vec<usize>,
}

impl<'a> OffsetTable<'a> {
    /// Validates the header of `buf`
    ///
    /// # Errors
    ///
    /// - `BufferTooShort` if fewer than 4 bytes, or a non-empty header under 8
    /// - `TotalLengthMismatch` if the header length disagrees with `buf.len()`
    /// - `InvalidFirstOffset` / `FirstOffsetOutOfRange` for a bad first offset
    /// - `TooFewFields` / `TooManyFields` if the count disagrees with `expected`
    /// - `DecreasingOffset` if the offsets are not non-decreasing
    pub fn parse(buf: &'a [u8], expected: ItemCount) -> CodecResult<Self> {
        if buf.len() < HEADER_WORD {
            return Err(CodecError::too_short(HEADER_WORD, buf.len()));
        }
        let total = read_word(buf, 0);
        if total != buf.len() {
            return Err(CodecError::new(CodecErrorKind::TotalLengthMismatch {
                declared: total,
                actual: buf.len(),
            }));
        }

        if total == HEADER_WORD {
            check_count(0, expected)?;
            return Ok(Self {
                buf,
                bounds: vec![HEADER_WORD],
            });
        }

        if total < HEADER_WORD * 2 {
            return Err(CodecError::too_short(HEADER_WORD * 2, total));
        }
        let first = read_word(buf, HEADER_WORD);
        if first % HEADER_WORD != 0 || first < HEADER_WORD * 2 {
            return Err(CodecError::new(CodecErrorKind::InvalidFirstOffset(first)));
        }
        if first > total {
            return Err(CodecError::new(CodecErrorKind::FirstOffsetOutOfRange {
                offset: first,
                total,
            }));
        }

        let count = first / HEADER_WORD - 1;
        check_count(count, expected)?;

        let mut bounds = Vec::with_capacity(count + 1);
        bounds.push(first);
        for i in 1..count {
            let offset = read_word(buf, HEADER_WORD * (i + 1));
            let previous = bounds[i - 1];
            if offset < previous {
                return Err(CodecError::new(CodecErrorKind::DecreasingOffset {
                    index: i,
                    offset,
                    previous_index: i - 1,
                    previous,
                }));
            }
            bounds.push(offset);
        }
        let last = bounds[count - 1];
        if total < last {
            return Err(CodecError::new(CodecErrorKind::DecreasingOffset {
                index: count,
                offset: total,
                previous_index: count - 1,
                previous: last,
            }));
        }
        bounds.push(total);

        Ok(Self { buf, bounds })
    }

    /// Number of items in the buffer
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Bytes of item `index`, or `None` if out of range
    pub fn item(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.len() {
            return None;
        }
        Some(&self.buf[self.bounds[index]..self.bounds[index + 1]])
    }

    /// Iterator over item slices
    pub fn items(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        let buf = self.buf;
        self.bounds.windows(2).map(move |w| &buf[w[0]..w[1]])
    }
}

fn check_count(actual: usize, expected: ItemCount) -> CodecResult<()> {
    match expected {
        ItemCount::Any => Ok(()),
        ItemCount::Declared {
            declared,
            compatible,
        } => {
            if actual < declared {
                Err(CodecError::new(CodecErrorKind::TooFewFields {
                    expected: declared,
                    actual,
                }))
            } else if actual > declared && !compatible {
                Err(CodecError::new(CodecErrorKind::TooManyFields {
                    expected: declared,
                    actual,
                }))
            } else {
                Ok(())
            }
        }
    }
}

/// Reads a little-endian header word; callers guarantee `pos + 4 <= buf.len()`
fn read_word(buf: &[u8], pos: usize) -> usize {
    let mut word = [0u8; HEADER_WORD];
    word.copy_from_slice(&buf[pos..pos + HEADER_WORD]);
    u32::from_le_bytes(word) as usize
}

pub(crate) fn to_u32(len: usize) -> CodecResult<u32> {
    u32::try_from(len).map_err(|_| CodecError::new(CodecErrorKind::LengthOverflow(len)))
}

fn write_word_at(out: &mut [u8], pos: usize, value: u32) {
    out[pos..pos + HEADER_WORD].copy_from_slice(&value.to_le_bytes());
}

/// Appends an offset table of `count` items to `out`.
///
/// `pack_item(out, i)` appends item `i`; the header is reserved up front and
/// patched once each item's start and the total length are known.
pub(crate) fn pack_offset_table<F>(out: &mut Vec<u8>, count: usize, mut pack_item: F) -> CodecResult<()>
where
    F: FnMut(&mut Vec<u8>, usize) -> CodecResult<()>,
{
    let start = out.len();
    let header = HEADER_WORD * (count + 1);
    out.resize(start + header, 0);
    for i in 0..count {
        let offset = to_u32(out.len() - start)?;
        write_word_at(out, start + HEADER_WORD * (i + 1), offset);
        pack_item(out, i)?;
    }
    let total = to_u32(out.len() - start)?;
    write_word_at(out, start, total);
    Ok(())
}

/// Assembles an offset table from already-encoded items
pub fn pack_items<I, B>(items: I) -> CodecResult<Vec<u8>>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let items: Vec<B> = items.into_iter().collect();
    let mut out = Vec::new();
    pack_offset_table(&mut out, items.len(), |out, i| {
        out.extend_from_slice(items[i].as_ref());
        Ok(())
    })?;
    Ok(out)
}

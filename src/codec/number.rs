//! Fixed-width unsigned integers
//!
//! Widths 1, 2, 4, 8, 16, 32 and 64 bytes are supported, in little-endian
//! (the molecule default) or big-endian byte order. Packing rejects values
//! that need more bits than the width provides.

use std::fmt;

use super::errors::{CodecError, CodecErrorKind, CodecResult};
use super::value::{Uint, Value};

/// Widths available as `Uint{8*w}` codecs
pub const UINT_WIDTHS: [usize; 7] = [1, 2, 4, 8, 16, 32, 64];

/// Byte order of a numeric codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Little => write!(f, "LE"),
            Endian::Big => write!(f, "BE"),
        }
    }
}

/// Maps a built-in numeric name to its width and byte order.
///
/// `Uint64` and `Uint64LE` are little-endian, `Uint64BE` is big-endian.
pub fn numeric_alias(name: &str) -> Option<(usize, Endian)> {
    let rest = name.strip_prefix("Uint")?;
    let (bits, endian) = if let Some(bits) = rest.strip_suffix("BE") {
        (bits, Endian::Big)
    } else if let Some(bits) = rest.strip_suffix("LE") {
        (bits, Endian::Little)
    } else {
        (rest, Endian::Little)
    };
    if bits.is_empty() || !bits.bytes().all(|b| b.is_ascii_digit()) || bits.starts_with('0') {
        return None;
    }
    let bits: usize = bits.parse().ok()?;
    if bits % 8 != 0 || !UINT_WIDTHS.contains(&(bits / 8)) {
        return None;
    }
    Some((bits / 8, endian))
}

pub(crate) fn check_width(width: usize) -> CodecResult<()> {
    if UINT_WIDTHS.contains(&width) {
        Ok(())
    } else {
        Err(CodecError::invalid_definition(format!(
            "unsupported integer width {} bytes",
            width
        )))
    }
}

pub(crate) fn pack_uint(
    value: &Value,
    width: usize,
    endian: Endian,
    out: &mut Vec<u8>,
) -> CodecResult<()> {
    let n = match value {
        Value::Uint(n) => n,
        other => return Err(CodecError::unexpected_value("uint", other.kind_name())),
    };
    let mut bytes = n.to_le_bytes(width).ok_or_else(|| {
        CodecError::new(CodecErrorKind::ValueOutOfRange {
            width,
            value: format!("{:x}", n),
        })
    })?;
    if endian == Endian::Big {
        bytes.reverse();
    }
    out.extend_from_slice(&bytes);
    Ok(())
}

pub(crate) fn unpack_uint(buf: &[u8], width: usize, endian: Endian) -> CodecResult<Value> {
    if buf.len() != width {
        return Err(CodecError::length_mismatch(width, buf.len()));
    }
    let n = match endian {
        Endian::Little => Uint::from_le_bytes(buf),
        Endian::Big => {
            let mut le = buf.to_vec();
            le.reverse();
            Uint::from_le_bytes(&le)
        }
    };
    Ok(Value::Uint(n))
}

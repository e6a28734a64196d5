//! Structured values produced by unpack and consumed by pack
//!
//! | Codec                         | Value                  |
//! |-------------------------------|------------------------|
//! | byte                          | `Byte`                 |
//! | Uint8..Uint512 (LE / BE)      | `Uint`                 |
//! | fixed bytes, raw byte vector  | `Bytes`                |
//! | array, fixvec, dynvec         | `List`                 |
//! | struct, table                 | `Record` (declared order) |
//! | option                        | `Opt`                  |
//! | union                         | `Union`                |

use std::fmt;

/// A decoded (or to-be-encoded) molecule value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Byte(u8),
    Uint(Uint),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    /// Named fields in declaration order
    Record(Vec<(String, Value)>),
    Opt(Option<Box<Value>>),
    Union { variant: String, value: Box<Value> },
}

impl Value {
    /// Short name of the variant, used in shape errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Byte(_) => "byte",
            Value::Uint(_) => "uint",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Opt(_) => "option",
            Value::Union { .. } => "union",
        }
    }

    pub fn uint(value: impl Into<Uint>) -> Self {
        Value::Uint(value.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Build a record from `(name, value)` pairs
    pub fn record<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn some(value: Value) -> Self {
        Value::Opt(Some(Box::new(value)))
    }

    pub fn none() -> Self {
        Value::Opt(None)
    }

    pub fn union(variant: impl Into<String>, value: Value) -> Self {
        Value::Union {
            variant: variant.into(),
            value: Box::new(value),
        }
    }

    /// Looks up a record field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Value::Byte(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<&Uint> {
        match self {
            Value::Uint(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// `Some(None)` for an absent option, `None` if not an option at all
    pub fn as_option(&self) -> Option<Option<&Value>> {
        match self {
            Value::Opt(inner) => Some(inner.as_deref()),
            _ => None,
        }
    }
}

/// Arbitrary-width unsigned integer
///
/// Stored as little-endian 32-bit words with no trailing zero words, so
/// equal numbers compare equal regardless of how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Uint {
    words: Vec<u32>,
}

impl Uint {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Build from little-endian 32-bit words
    pub fn from_words(mut words: Vec<u32>) -> Self {
        while words.last() == Some(&0) {
            words.pop();
        }
        Self { words }
    }

    /// Build from little-endian bytes of any length
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let words = bytes
            .chunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[..chunk.len()].copy_from_slice(chunk);
                u32::from_le_bytes(word)
            })
            .collect();
        Self::from_words(words)
    }

    /// Little-endian words, least significant first
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn is_zero(&self) -> bool {
        self.words.is_empty()
    }

    /// Number of significant bits
    pub fn bit_len(&self) -> usize {
        match self.words.last() {
            None => 0,
            Some(top) => (self.words.len() - 1) * 32 + (32 - top.leading_zeros() as usize),
        }
    }

    /// Little-endian bytes padded to `width`, or `None` if the value needs more
    pub fn to_le_bytes(&self, width: usize) -> Option<Vec<u8>> {
        if self.bit_len() > width * 8 {
            return None;
        }
        let mut out = vec![0u8; width];
        for (i, word) in self.words.iter().enumerate() {
            let start = i * 4;
            let end = (start + 4).min(width);
            out[start..end].copy_from_slice(&word.to_le_bytes()[..end - start]);
        }
        Some(out)
    }

    pub fn to_u64(&self) -> Option<u64> {
        if self.bit_len() > 64 {
            return None;
        }
        Some(
            self.words
                .iter()
                .rev()
                .fold(0u64, |acc, w| (acc << 32) | u64::from(*w)),
        )
    }

    pub fn to_u128(&self) -> Option<u128> {
        if self.bit_len() > 128 {
            return None;
        }
        Some(
            self.words
                .iter()
                .rev()
                .fold(0u128, |acc, w| (acc << 32) | u128::from(*w)),
        )
    }
}

macro_rules! uint_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Uint {
                fn from(value: $t) -> Self {
                    Uint::from_le_bytes(&value.to_le_bytes())
                }
            }
        )*
    };
}

uint_from_primitive!(u8, u16, u32, u64, u128);

impl fmt::LowerHex for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = self.words.iter().rev();
        match words.next() {
            None => write!(f, "0"),
            Some(top) => {
                write!(f, "{:x}", top)?;
                for word in words {
                    write!(f, "{:08x}", word)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Uint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u128() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "0x{:x}", self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint_is_normalized() {
        assert_eq!(Uint::from_words(vec![5, 0, 0]), Uint::from(5u8));
        assert_eq!(Uint::from(0u64), Uint::zero());
        assert!(Uint::from(0u128).is_zero());
    }

    #[test]
    fn test_bit_len() {
        assert_eq!(Uint::zero().bit_len(), 0);
        assert_eq!(Uint::from(1u8).bit_len(), 1);
        assert_eq!(Uint::from(255u8).bit_len(), 8);
        assert_eq!(Uint::from(256u16).bit_len(), 9);
        assert_eq!(Uint::from(u64::MAX).bit_len(), 64);
    }

    #[test]
    fn test_to_le_bytes_checks_width() {
        assert_eq!(Uint::from(0x1234u16).to_le_bytes(2), Some(vec![0x34, 0x12]));
        assert_eq!(Uint::from(0x1234u16).to_le_bytes(3), Some(vec![0x34, 0x12, 0x00]));
        assert_eq!(Uint::from(256u16).to_le_bytes(1), None);
    }

    #[test]
    fn test_primitive_conversions() {
        let n = Uint::from(0x0102_0304_0506_0708u64);
        assert_eq!(n.to_u64(), Some(0x0102_0304_0506_0708));
        assert_eq!(n.to_u128(), Some(0x0102_0304_0506_0708));
        let wide = Uint::from_words(vec![0, 0, 0, 0, 1]);
        assert_eq!(wide.to_u128(), None);
    }

    #[test]
    fn test_lower_hex() {
        assert_eq!(format!("{:x}", Uint::zero()), "0");
        assert_eq!(format!("{:x}", Uint::from(0x1_0000_0001u64)), "100000001");
    }

    #[test]
    fn test_record_field_lookup() {
        let record = Value::record([("a", Value::Byte(1)), ("b", Value::none())]);
        assert_eq!(record.field("a"), Some(&Value::Byte(1)));
        assert_eq!(record.field("b").and_then(Value::as_option), Some(None));
        assert_eq!(record.field("c"), None);
    }
}

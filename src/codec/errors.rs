//! Codec error types
//!
//! Error codes:
//! - MOL_CODEC_LENGTH_MISMATCH: buffer length disagrees with the layout
//! - MOL_CODEC_INVALID_LAYOUT: malformed offset table header
//! - MOL_CODEC_VALUE_OUT_OF_RANGE: numeric value wider than its codec
//! - MOL_CODEC_UNKNOWN_UNION_VARIANT: union tag or variant name not declared
//! - MOL_CODEC_SHAPE_MISMATCH: value does not have the shape the codec expects
//! - MOL_CODEC_INVALID_DEFINITION: codec constructed from incompatible parts
//!
//! Every error carries the path from the root value to the element that
//! failed, e.g. `input.raw.inputs[2].since`. Paths are assembled while the
//! error propagates out of nested pack/unpack calls.

use std::fmt;

use thiserror::Error;

/// Codec error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecErrorCode {
    /// Buffer length does not match the required length
    LengthMismatch,
    /// Offset table header is malformed
    InvalidLayout,
    /// Numeric value does not fit in its byte width
    ValueOutOfRange,
    /// Union tag or variant name is not declared
    UnknownUnionVariant,
    /// Value shape does not match the codec
    ShapeMismatch,
    /// Codec definition is invalid
    InvalidDefinition,
}

impl CodecErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            CodecErrorCode::LengthMismatch => "MOL_CODEC_LENGTH_MISMATCH",
            CodecErrorCode::InvalidLayout => "MOL_CODEC_INVALID_LAYOUT",
            CodecErrorCode::ValueOutOfRange => "MOL_CODEC_VALUE_OUT_OF_RANGE",
            CodecErrorCode::UnknownUnionVariant => "MOL_CODEC_UNKNOWN_UNION_VARIANT",
            CodecErrorCode::ShapeMismatch => "MOL_CODEC_SHAPE_MISMATCH",
            CodecErrorCode::InvalidDefinition => "MOL_CODEC_INVALID_DEFINITION",
        }
    }
}

impl fmt::Display for CodecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// What went wrong, independent of where
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecErrorKind {
    // ==================
    // Length errors
    // ==================
    #[error("expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("buffer too short: need at least {min} bytes, got {actual}")]
    BufferTooShort { min: usize, actual: usize },

    #[error("header total length {declared} does not match buffer length {actual}")]
    TotalLengthMismatch { declared: usize, actual: usize },

    #[error("item count {count} with item size {item_size} overflows the buffer length")]
    ItemCountOverflow { count: usize, item_size: usize },

    #[error("length {0} does not fit in a 32-bit header")]
    LengthOverflow(usize),

    // ==================
    // Layout errors
    // ==================
    #[error("invalid first offset {0}: must be a multiple of 4 and at least 8")]
    InvalidFirstOffset(usize),

    #[error("first offset {offset} is larger than total length {total}")]
    FirstOffsetOutOfRange { offset: usize, total: usize },

    #[error("item count not enough: required {expected}, actual {actual}")]
    TooFewFields { expected: usize, actual: usize },

    #[error("item count is more than required: required {expected}, actual {actual}")]
    TooManyFields { expected: usize, actual: usize },

    #[error("offset {index} ({offset}) is smaller than offset {previous_index} ({previous})")]
    DecreasingOffset {
        index: usize,
        offset: usize,
        previous_index: usize,
        previous: usize,
    },

    // ==================
    // Range errors
    // ==================
    #[error("value 0x{value} does not fit in {width} bytes")]
    ValueOutOfRange { width: usize, value: String },

    // ==================
    // Union errors
    // ==================
    #[error("unknown union variant id {0}")]
    UnknownUnionId(u32),

    #[error("unknown union variant '{0}'")]
    UnknownUnionVariant(String),

    // ==================
    // Shape errors
    // ==================
    #[error("expected {expected} value, got {actual}")]
    UnexpectedValue {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("expected {expected} items, got {actual}")]
    ItemCountMismatch { expected: usize, actual: usize },

    #[error("missing field '{0}'")]
    MissingField(String),

    #[error("undeclared field '{0}'")]
    UnexpectedField(String),

    // ==================
    // Definition errors
    // ==================
    #[error("{0}")]
    InvalidDefinition(String),
}

impl CodecErrorKind {
    /// Returns the error code for this kind
    pub fn code(&self) -> CodecErrorCode {
        match self {
            CodecErrorKind::LengthMismatch { .. }
            | CodecErrorKind::BufferTooShort { .. }
            | CodecErrorKind::TotalLengthMismatch { .. }
            | CodecErrorKind::ItemCountOverflow { .. }
            | CodecErrorKind::LengthOverflow(_) => CodecErrorCode::LengthMismatch,
            CodecErrorKind::InvalidFirstOffset(_)
            | CodecErrorKind::FirstOffsetOutOfRange { .. }
            | CodecErrorKind::TooFewFields { .. }
            | CodecErrorKind::TooManyFields { .. }
            | CodecErrorKind::DecreasingOffset { .. } => CodecErrorCode::InvalidLayout,
            CodecErrorKind::ValueOutOfRange { .. } => CodecErrorCode::ValueOutOfRange,
            CodecErrorKind::UnknownUnionId(_) | CodecErrorKind::UnknownUnionVariant(_) => {
                CodecErrorCode::UnknownUnionVariant
            }
            CodecErrorKind::UnexpectedValue { .. }
            | CodecErrorKind::ItemCountMismatch { .. }
            | CodecErrorKind::MissingField(_)
            | CodecErrorKind::UnexpectedField(_) => CodecErrorCode::ShapeMismatch,
            CodecErrorKind::InvalidDefinition(_) => CodecErrorCode::InvalidDefinition,
        }
    }
}

/// One step of the path from the root value to a failing element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named struct / table field
    Field(String),
    /// List position
    Index(usize),
    /// The inner value of a present option
    Optional,
    /// The body of a union variant
    Variant(String),
}

/// Codec error with the failing location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    kind: CodecErrorKind,
    /// Innermost segment first; reversed when rendered
    path: Vec<PathSegment>,
}

impl CodecError {
    /// Create an error at the current (innermost) location
    pub fn new(kind: CodecErrorKind) -> Self {
        Self {
            kind,
            path: Vec::new(),
        }
    }

    /// Create a length mismatch error
    pub fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::new(CodecErrorKind::LengthMismatch { expected, actual })
    }

    /// Create a buffer-too-short error
    pub fn too_short(min: usize, actual: usize) -> Self {
        Self::new(CodecErrorKind::BufferTooShort { min, actual })
    }

    /// Create an unexpected value error
    pub fn unexpected_value(expected: &'static str, actual: &'static str) -> Self {
        Self::new(CodecErrorKind::UnexpectedValue { expected, actual })
    }

    /// Create an invalid definition error
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::new(CodecErrorKind::InvalidDefinition(message.into()))
    }

    /// Prefix the path with a field name
    pub fn at_field(mut self, name: &str) -> Self {
        self.path.push(PathSegment::Field(name.to_string()));
        self
    }

    /// Prefix the path with a list index
    pub fn at_index(mut self, index: usize) -> Self {
        self.path.push(PathSegment::Index(index));
        self
    }

    /// Prefix the path with an option unwrap
    pub fn at_option(mut self) -> Self {
        self.path.push(PathSegment::Optional);
        self
    }

    /// Prefix the path with a union variant
    pub fn at_variant(mut self, name: &str) -> Self {
        self.path.push(PathSegment::Variant(name.to_string()));
        self
    }

    /// Returns the error kind
    pub fn kind(&self) -> &CodecErrorKind {
        &self.kind
    }

    /// Returns the error code
    pub fn code(&self) -> CodecErrorCode {
        self.kind.code()
    }

    /// Returns the path segments, outermost first
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.path.iter().rev()
    }

    /// Renders the path, e.g. `input.raw.inputs[0]`
    pub fn path(&self) -> String {
        let mut rendered = String::from("input");
        for segment in self.segments() {
            match segment {
                PathSegment::Field(name) => {
                    rendered.push('.');
                    rendered.push_str(name);
                }
                PathSegment::Index(index) => {
                    rendered.push_str(&format!("[{}]", index));
                }
                PathSegment::Optional => rendered.push('?'),
                PathSegment::Variant(name) => {
                    rendered.push_str(&format!("<{}>", name));
                }
            }
        }
        rendered
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code(), self.path(), self.kind)
    }
}

impl std::error::Error for CodecError {}

impl From<CodecErrorKind> for CodecError {
    fn from(kind: CodecErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Path tracking on results, applied as errors leave a nested element.
pub(crate) trait TrackPath<T> {
    fn at_field(self, name: &str) -> CodecResult<T>;
    fn at_index(self, index: usize) -> CodecResult<T>;
    fn at_option(self) -> CodecResult<T>;
    fn at_variant(self, name: &str) -> CodecResult<T>;
}

impl<T> TrackPath<T> for CodecResult<T> {
    fn at_field(self, name: &str) -> CodecResult<T> {
        self.map_err(|e| e.at_field(name))
    }

    fn at_index(self, index: usize) -> CodecResult<T> {
        self.map_err(|e| e.at_index(index))
    }

    fn at_option(self) -> CodecResult<T> {
        self.map_err(CodecError::at_option)
    }

    fn at_variant(self, name: &str) -> CodecResult<T> {
        self.map_err(|e| e.at_variant(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(CodecErrorCode::LengthMismatch.code(), "MOL_CODEC_LENGTH_MISMATCH");
        assert_eq!(CodecErrorCode::InvalidLayout.code(), "MOL_CODEC_INVALID_LAYOUT");
        assert_eq!(CodecErrorCode::ValueOutOfRange.code(), "MOL_CODEC_VALUE_OUT_OF_RANGE");
        assert_eq!(
            CodecErrorCode::UnknownUnionVariant.code(),
            "MOL_CODEC_UNKNOWN_UNION_VARIANT"
        );
    }

    #[test]
    fn test_kind_maps_to_code() {
        let err = CodecError::new(CodecErrorKind::DecreasingOffset {
            index: 2,
            offset: 8,
            previous_index: 1,
            previous: 12,
        });
        assert_eq!(err.code(), CodecErrorCode::InvalidLayout);
        assert_eq!(
            CodecError::length_mismatch(4, 3).code(),
            CodecErrorCode::LengthMismatch
        );
    }

    #[test]
    fn test_path_is_rendered_outermost_first() {
        let err = CodecError::length_mismatch(8, 7)
            .at_field("since")
            .at_index(0)
            .at_field("inputs")
            .at_field("raw");
        assert_eq!(err.path(), "input.raw.inputs[0].since");
    }

    #[test]
    fn test_display_contains_code_path_and_reason() {
        let err = CodecError::length_mismatch(4, 3).at_option().at_field("lock");
        let display = format!("{}", err);
        assert!(display.contains("MOL_CODEC_LENGTH_MISMATCH"));
        assert!(display.contains("input.lock?"));
        assert!(display.contains("expected 4 bytes, got 3"));
    }
}

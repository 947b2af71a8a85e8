//! Error types for Carbon
//!
//! Provides a unified error type for codec and transport operations.

use thiserror::Error;

use crate::protocol::FieldType;

/// Result type alias using CarbonError
pub type Result<T> = std::result::Result<T, CarbonError>;

/// Unified error type for Carbon operations
#[derive(Debug, Error)]
pub enum CarbonError {
    // -------------------------------------------------------------------------
    // Decode Errors (wire anomalies)
    // -------------------------------------------------------------------------
    #[error("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("Invalid varint: more than {max_len} bytes or value overflows u64")]
    InvalidVarint { max_len: usize },

    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Unknown field type tag: 0x{0:02x}")]
    UnknownTag(u8),

    #[error("Field type {0} cannot be used as a container element")]
    InvalidElementType(FieldType),

    #[error("Integer {value} out of range for {target}")]
    IntegerOutOfRange { value: i64, target: &'static str },

    #[error("Nesting depth exceeds limit of {max}")]
    DepthExceeded { max: usize },

    #[error("{0} trailing bytes after top-level struct")]
    TrailingBytes(usize),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: FieldType, actual: FieldType },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Frame checksum mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CarbonError {
    /// Shorthand for an underrun of `needed` bytes with `remaining` left
    pub(crate) fn underrun(needed: usize, remaining: usize) -> Self {
        CarbonError::BufferUnderrun { needed, remaining }
    }

    /// True for errors caused by malformed or truncated wire bytes.
    ///
    /// A router treats these as "unparsable message" and answers with a
    /// protocol error instead of routing the request.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CarbonError::BufferUnderrun { .. }
                | CarbonError::InvalidVarint { .. }
                | CarbonError::InvalidUtf8(_)
                | CarbonError::UnknownTag(_)
                | CarbonError::InvalidElementType(_)
                | CarbonError::IntegerOutOfRange { .. }
                | CarbonError::DepthExceeded { .. }
                | CarbonError::TrailingBytes(_)
        )
    }
}

//! # Domain Errors
//!
//! Everything that can go wrong turning bytes into nodes or nodes into
//! typed values.

use thiserror::Error;

/// Codec decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input ends before the declared length is satisfied.
    #[error("Truncated input: need {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required by the prefix
        needed: usize,
        /// Bytes actually available
        available: usize,
    },

    /// A length prefix is not in its minimal form.
    #[error("Non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    /// Lists nest deeper than the configured bound.
    #[error("Nesting depth exceeds {max}")]
    DepthExceeded {
        /// Configured bound
        max: usize,
    },

    /// A prefix declares more bytes than the configured bound.
    #[error("Declared length {len} exceeds limit {max}")]
    PayloadTooLarge {
        /// Declared length (saturated at `usize::MAX`)
        len: usize,
        /// Configured bound
        max: usize,
    },

    /// Bytes remain after a complete item where none were expected.
    #[error("Trailing bytes: consumed {consumed} of {total}")]
    TrailingBytes {
        /// Bytes consumed by the item
        consumed: usize,
        /// Total input length
        total: usize,
    },

    /// A list was found where a byte string was expected, or vice versa.
    #[error("Unexpected shape: expected {expected}")]
    UnexpectedShape {
        /// Shape that was expected ("bytes" or "list")
        expected: &'static str,
    },

    /// An integer does not fit in the requested width.
    #[error("Integer of {len} bytes does not fit in {max_bytes} bytes")]
    IntegerOverflow {
        /// Significant bytes in the value
        len: usize,
        /// Width of the target type
        max_bytes: usize,
    },

    /// A fixed-width value has the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required length
        expected: usize,
        /// Actual length
        got: usize,
    },
}

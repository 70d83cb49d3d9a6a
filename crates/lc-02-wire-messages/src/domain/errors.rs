//! # Domain Errors
//!
//! Message-level decode failures. Each names the field it failed on.

use lc_01_rlp_codec::DecodeError;
use thiserror::Error;

/// Wire message decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The payload bytes are not a valid RLP item.
    #[error("Malformed payload: {0}")]
    Payload(#[from] DecodeError),

    /// A field is present but has the wrong shape or value.
    #[error("Invalid field `{field}`: {source}")]
    Field {
        /// Offending field
        field: &'static str,
        /// Underlying codec error
        #[source]
        source: DecodeError,
    },

    /// A required positional field is absent.
    #[error("Missing field `{field}` at index {index}")]
    MissingField {
        /// Missing field
        field: &'static str,
        /// Expected position
        index: usize,
    },
}

impl MessageError {
    /// Name of the offending field, when the error is about one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            MessageError::Payload(_) => None,
            MessageError::Field { field, .. } | MessageError::MissingField { field, .. } => {
                Some(field)
            }
        }
    }
}

//! # Error Types
//!
//! Coarse error classification shared by every subsystem. Each crate keeps
//! its own detailed error enum and maps it onto an `ErrorKind` so callers
//! can react to the class of failure without matching on every variant.

use thiserror::Error;

/// Class of a failure, as seen by the caller of a public operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Truncated, non-canonical, oversized or malformed input.
    #[error("decode error")]
    Decode,
    /// Transport unreachable.
    #[error("connectivity error")]
    Connectivity,
    /// The provider returned a well-formed error response.
    #[error("rejected by remote")]
    RemoteRejected,
    /// Key unavailable or malformed signing input.
    #[error("signing error")]
    Signing,
    /// Anything else (configuration, lifecycle misuse).
    #[error("other error")]
    Other,
}

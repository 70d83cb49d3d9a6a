//! # Domain Errors
//!
//! Error types for building, signing and sending transactions.

use lc_01_rlp_codec::DecodeError;
use lc_03_syncer::SyncerError;
use shared_types::ErrorKind;
use thiserror::Error;

/// Errors from the signing step. Fatal to the single operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("Invalid signing key")]
    InvalidKey,

    /// Input could not be signed.
    #[error("Malformed signing input: {0}")]
    Malformed(String),

    /// Public key could not be recovered from the signature.
    #[error("Failed to recover public key")]
    RecoveryFailed,
}

/// Transaction pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Signing failed.
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// The syncer failed while fetching the nonce, estimating or submitting.
    #[error("Syncer error: {0}")]
    Syncer(#[from] SyncerError),

    /// A broadcast payload could not be parsed.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Caller input is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TransactionError {
    /// Class of this failure; `RemoteRejected` survives the wrapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::Signing(_) => ErrorKind::Signing,
            TransactionError::Syncer(err) => err.kind(),
            TransactionError::Decode(_) => ErrorKind::Decode,
            TransactionError::InvalidInput(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_rejection_kind_survives() {
        let err = TransactionError::from(SyncerError::RemoteRejected {
            code: -32000,
            message: "nonce too low".into(),
        });
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(err.to_string().contains("nonce too low"));
    }

    #[test]
    fn test_signing_kind() {
        let err = TransactionError::from(SigningError::InvalidKey);
        assert_eq!(err.kind(), ErrorKind::Signing);
    }
}

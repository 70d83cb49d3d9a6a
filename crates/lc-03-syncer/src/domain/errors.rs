//! # Domain Errors
//!
//! Failures of remote chain-data operations.

use shared_types::{ErrorKind, NotSyncedReason};
use std::time::Duration;
use thiserror::Error;

/// Syncer error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncerError {
    /// Transport unreachable or connection lost.
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// The provider answered with a well-formed error response.
    #[error("Remote rejected request ({code}): {message}")]
    RemoteRejected {
        /// Provider error code
        code: i64,
        /// Provider error message
        message: String,
    },

    /// A response had the wrong shape for the request.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// No response within the configured request timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Operation needs a started syncer.
    #[error("Syncer not started")]
    NotStarted,

    /// The request was abandoned because the syncer stopped.
    #[error("Request cancelled")]
    Cancelled,

    /// The selected provider has no transport to talk through.
    #[error("No transport configured for the {0} provider")]
    MissingTransport(&'static str),
}

impl SyncerError {
    /// Class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncerError::Connectivity(_) | SyncerError::Timeout(_) => ErrorKind::Connectivity,
            SyncerError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            SyncerError::Decode(_) => ErrorKind::Decode,
            SyncerError::NotStarted | SyncerError::Cancelled | SyncerError::MissingTransport(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Reason to report when this failure takes the client out of sync.
    pub fn not_synced_reason(&self) -> NotSyncedReason {
        match self {
            SyncerError::RemoteRejected { message, .. } => {
                NotSyncedReason::Remote(message.clone())
            }
            other => NotSyncedReason::Connectivity(other.to_string()),
        }
    }
}

//! # Domain Errors
//!
//! Error types for the blockchain state machine.

use lc_03_syncer::SyncerError;
use shared_types::ErrorKind;
use thiserror::Error;

/// State machine error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The active syncer failed.
    #[error("Syncer error: {0}")]
    Syncer(#[from] SyncerError),

    /// Operation needs a started state machine.
    #[error("State machine not started")]
    NotStarted,

    /// The persistence collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StateError {
    /// Class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StateError::Syncer(err) => err.kind(),
            StateError::NotStarted | StateError::Storage(_) => ErrorKind::Other,
        }
    }
}

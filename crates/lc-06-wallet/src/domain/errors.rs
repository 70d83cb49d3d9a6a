//! # Wallet Errors
//!
//! One error type for the facade, wrapping every subsystem's error without
//! losing its kind.

use crate::config::ConfigError;
use lc_03_syncer::SyncerError;
use lc_04_blockchain_state::StateError;
use lc_05_transactions::{SigningError, TransactionError};
use shared_types::ErrorKind;
use thiserror::Error;

/// Wallet facade errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Syncer failure.
    #[error(transparent)]
    Syncer(#[from] SyncerError),

    /// State machine failure.
    #[error(transparent)]
    State(#[from] StateError),

    /// Transaction pipeline failure.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Signer could not be loaded.
    #[error(transparent)]
    Signing(#[from] SigningError),

    /// A required builder input was not supplied.
    #[error("Missing builder input: {0}")]
    MissingInput(&'static str),
}

impl WalletError {
    /// Class of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::Syncer(err) => err.kind(),
            WalletError::State(err) => err.kind(),
            WalletError::Transaction(err) => err.kind(),
            WalletError::Signing(_) => ErrorKind::Signing,
            WalletError::Config(_) | WalletError::MissingInput(_) => ErrorKind::Other,
        }
    }
}

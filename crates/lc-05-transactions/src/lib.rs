//! # LC-05 Transactions
//!
//! Builds, signs and broadcasts legacy transactions.
//!
//! **Subsystem ID:** 5
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Pipeline
//!
//! | Step | Input | Output | Suspends |
//! |------|-------|--------|----------|
//! | `build_raw` | `SendRequest` | `RawTransaction` | only to fetch a missing nonce |
//! | `sign` | `RawTransaction` | `Signature` | no |
//! | `encode` | `RawTransaction` + `Signature` | broadcast bytes | no |
//! | `send` | `SendRequest` | `SentTransaction` | nonce fetch, submit |
//!
//! Signing is EIP-155 over secp256k1 with RFC 6979 nonces: the same key and
//! transaction always produce the same signature.
//!
//! ## Module Structure
//!
//! ```text
//! lc-05-transactions/
//! ├── domain/          # RawTransaction, Signature, TransactionSigner, errors
//! ├── algorithms/      # legacy tuple encoding, signing hash, decoding
//! ├── ports/           # TransactionRegistry + RecordingRegistry
//! ├── application/     # TransactionPipeline
//! └── config.rs        # TransactionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{
    decode_signed, encode_signed, signing_hash, signing_payload, transaction_hash,
    DecodedTransaction,
};
pub use application::TransactionPipeline;
pub use config::TransactionConfig;
pub use domain::{
    recover_signer, RawTransaction, SendRequest, SentTransaction, Signature, SigningError,
    TransactionError, TransactionSigner, MAX_CHAIN_ID,
};
pub use ports::{RecordingRegistry, TransactionRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

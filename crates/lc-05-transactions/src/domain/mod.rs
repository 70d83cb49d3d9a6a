//! # Domain Layer
//!
//! Transaction records, the secp256k1 signer and errors.

pub mod entities;
pub mod errors;
pub mod signer;

pub use entities::{
    RawTransaction, SendRequest, SentTransaction, Signature, MAX_CHAIN_ID,
};
pub use errors::{SigningError, TransactionError};
pub use signer::{recover_signer, TransactionSigner};

//! # Algorithms
//!
//! Pure encoding functions for legacy transactions.

pub mod encoding;

pub use encoding::{
    decode_signed, encode_signed, signing_hash, signing_payload, transaction_hash,
    DecodedTransaction,
};

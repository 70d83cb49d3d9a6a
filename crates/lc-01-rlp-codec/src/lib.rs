//! # LC-01 RLP Codec
//!
//! Recursive length-prefix encoding of nested byte strings and lists.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (pure domain + algorithms, no I/O)
//!
//! ## Purpose
//!
//! Every protocol payload and every signed transaction is serialized with
//! this codec. Input usually comes straight off the network, so decoding is
//! strict and bounded:
//!
//! | Guard | Behaviour |
//! |-------|-----------|
//! | Truncation | Declared length longer than the input is an error |
//! | Canonical form | Non-minimal length prefixes are rejected, never normalised |
//! | Depth bound | Nesting beyond `RlpConfig::max_depth` is rejected |
//! | Size bound | Declared lengths beyond `RlpConfig::max_payload` are rejected |
//!
//! Because only canonical input is accepted, re-encoding a decoded node
//! reproduces the original bytes exactly.
//!
//! ## Module Structure
//!
//! ```text
//! lc-01-rlp-codec/
//! ├── domain/          # RlpNode, DecodeError
//! ├── algorithms/      # encode, decode
//! └── config.rs        # RlpConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;

// Re-exports
pub use algorithms::{decode, decode_exact, decode_exact_with, decode_with, encode, encode_into};
pub use config::RlpConfig;
pub use domain::{DecodeError, RlpNode, MAX_SHORT_LENGTH, SINGLE_BYTE_THRESHOLD};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

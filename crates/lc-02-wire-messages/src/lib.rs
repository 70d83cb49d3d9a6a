//! # LC-02 Wire Messages
//!
//! Typed light-protocol messages on top of the RLP codec.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (pure domain, no I/O)
//!
//! ## Framing
//!
//! ```text
//! ┌──────────────┬───────────────────────────────┐
//! │ RLP(code)    │ RLP(body list)                │
//! └──────────────┴───────────────────────────────┘
//! ```
//!
//! Every message is self-describing: its body is one RLP list whose
//! children are read by fixed position. Decoding never depends on earlier
//! messages. An unknown code is not an error; it yields
//! [`Decoded::Unrecognized`] and the caller decides what to do.
//!
//! | Code | Message |
//! |------|---------|
//! | 0x00 | `Status` |
//! | 0x01 | `Announce` |
//! | 0x02 | `GetBlockHeaders` |
//! | 0x03 | `BlockHeaders` |
//! | 0x13 | `SendTransaction` |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod messages;

// Re-exports
pub use domain::{BlockHeader, MessageError, LOGS_BLOOM_LEN};
pub use messages::{
    decode_message, decode_message_with, frame, unframe, unframe_with, AnnounceMessage,
    BlockHeadersMessage, BlockRef, Decoded, GetBlockHeadersMessage, MessageCode,
    SendTransactionMessage, StatusMessage, WireMessage,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

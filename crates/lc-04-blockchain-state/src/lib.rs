//! # LC-04 Blockchain State
//!
//! Per-account view of the chain: last known height and balance, sync
//! state and transaction history, with change streams for each.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Streams
//!
//! | Stream | Item | Emitted when |
//! |--------|------|--------------|
//! | `height_updates` | `u64` | the height differs from the stored one |
//! | `balance_updates` | `U256` | the balance differs from the stored one |
//! | `sync_state_updates` | `SyncState` | the state differs under relaxed equality |
//! | `transaction_updates` | `Vec<TransactionRecord>` | a transaction is added or included |
//!
//! Each stream has one active subscription and buffers undelivered
//! updates; a full buffer drops the oldest.
//!
//! ## Module Structure
//!
//! ```text
//! lc-04-blockchain-state/
//! ├── domain/          # StateError, TransactionSet
//! ├── ports/           # StateStorage + InMemoryStateStorage
//! ├── application/     # BlockchainStateMachine
//! └── config.rs        # StateConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::BlockchainStateMachine;
pub use config::StateConfig;
pub use domain::{StateError, TransactionSet};
pub use ports::{InMemoryStateStorage, StateStorage, StoredAccount};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

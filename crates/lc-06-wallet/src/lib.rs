//! # LC-06 Wallet
//!
//! Facade that wires the syncer, the blockchain state machine and the
//! transaction pipeline into one single-account light wallet.
//!
//! **Subsystem ID:** 6
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Surface
//!
//! | Group | Operations |
//! |-------|------------|
//! | Lifecycle | `start`, `stop`, `refresh`, `set_reachable` |
//! | Transactions | `send`, `estimate_gas`, `transaction_receipt`, `transaction_count` |
//! | Reads | `receive_address`, `balance`, `last_block_height`, `sync_state`, `transactions`, `logs` |
//! | Streams | `height_updates`, `balance_updates`, `sync_state_updates`, `transactions_updates` |
//!
//! ## Module Structure
//!
//! ```text
//! lc-06-wallet/
//! ├── domain/          # WalletError
//! ├── adapters/        # StateRegistry (pipeline → state machine)
//! ├── application/     # LightWallet, WalletBuilder
//! ├── config.rs        # WalletConfig, LC_* overrides
//! └── telemetry.rs     # init_tracing
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod telemetry;

// Re-exports
pub use adapters::StateRegistry;
pub use application::{LightWallet, WalletBuilder};
pub use config::{ConfigError, WalletConfig};
pub use domain::WalletError;
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # LC-03 Syncer
//!
//! Pluggable provider of remote chain data.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Hide transport and provider differences behind one capability set:
//! balance, height, nonce, logs, receipts, submission and gas estimation,
//! plus a stream of height/balance/sync-state updates while started.
//!
//! ## Providers
//!
//! | Provider | Transport | Recovery |
//! |----------|-----------|----------|
//! | `PollingSyncer` | remote-procedure calls on an interval | capped backoff, reset on success; parks while unreachable |
//! | `SocketSyncer` | one persistent connection | exponential reconnect with full jitter |
//!
//! Both guarantee:
//! - at most one outstanding height fetch and one balance fetch; a refresh
//!   arriving meanwhile is coalesced
//! - consecutive duplicate sync states are reported once
//! - after `stop`, responses from the stopped cycle never reach the sink
//!
//! ## Module Structure
//!
//! ```text
//! lc-03-syncer/
//! ├── domain/          # SyncerError, SyncerEvent, RpcRequest/RpcValue, logs, receipts
//! ├── algorithms/      # Backoff, InFlight, Generation, SyncStateReporter
//! ├── ports/           # Syncer (inbound), RpcClient + SocketTransport (outbound), mocks
//! ├── adapters/        # PollingSyncer, SocketSyncer
//! ├── application/     # build_syncer
//! └── config.rs        # SyncerConfig, ProviderConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{PollingSyncer, SocketSyncer};
pub use algorithms::{Backoff, Generation, InFlight, SyncStateReporter};
pub use application::{build_syncer, Transports};
pub use config::{ProviderConfig, SyncerConfig};
pub use domain::{
    CallRequest, Log, LogFilter, RpcRequest, RpcValue, SyncerError, SyncerEvent,
    TransactionReceipt,
};
pub use ports::{
    event_channel, EventSink, EventStream, MockChain, MockRpcClient, MockSocketTransport,
    MockSyncer, RpcClient, SocketEvent, SocketFrame, SocketTransport, Syncer,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}

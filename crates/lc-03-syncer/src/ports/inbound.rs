//! # Inbound Ports
//!
//! The capability set every provider exposes.

use crate::domain::{CallRequest, Log, LogFilter, SyncerError, SyncerEvent, TransactionReceipt};
use async_trait::async_trait;
use shared_types::{Address, Hash, SyncState, U256};
use tokio::sync::mpsc;

/// Where a started syncer delivers its updates.
pub type EventSink = mpsc::UnboundedSender<SyncerEvent>;

/// Receiving end handed back to the owner of a syncer.
pub type EventStream = mpsc::UnboundedReceiver<SyncerEvent>;

/// Create a connected sink/stream pair.
pub fn event_channel() -> (EventSink, EventStream) {
    mpsc::unbounded_channel()
}

/// Provider of remote chain data.
///
/// Exactly one implementation is active per client. After `start`, the
/// syncer pushes height, balance and sync-state updates into the sink
/// until `stop`; after `stop`, nothing more arrives on that sink even if
/// responses from the stopped cycle are still in flight.
#[async_trait]
pub trait Syncer: Send + Sync {
    /// Begin tracking `address`, delivering updates to `sink`.
    ///
    /// Starting a started syncer replaces the previous cycle.
    async fn start(&self, address: Address, sink: EventSink) -> Result<(), SyncerError>;

    /// Cancel in-flight work and stop delivering updates.
    async fn stop(&self);

    /// Re-fetch height and balance now. Coalesced with any fetch already
    /// outstanding for the same resource.
    async fn refresh(&self) -> Result<(), SyncerError>;

    /// Balance of `address` at the latest block.
    async fn fetch_balance(&self, address: Address) -> Result<U256, SyncerError>;

    /// Current head height.
    async fn fetch_height(&self) -> Result<u64, SyncerError>;

    /// Next nonce of `address`.
    async fn fetch_nonce(&self, address: Address) -> Result<u64, SyncerError>;

    /// Logs matching `filter`.
    async fn fetch_logs(&self, filter: LogFilter) -> Result<Vec<Log>, SyncerError>;

    /// Receipt of `hash`, `None` while it is still pending.
    async fn fetch_receipt(&self, hash: Hash) -> Result<Option<TransactionReceipt>, SyncerError>;

    /// Broadcast a signed, encoded transaction. Returns the provider's hash.
    async fn submit(&self, signed: Vec<u8>) -> Result<Hash, SyncerError>;

    /// Gas needed by `call`.
    async fn estimate_gas(&self, call: CallRequest) -> Result<u64, SyncerError>;

    /// Last reported link health.
    fn sync_state(&self) -> SyncState;

    /// Externally detected network reachability. Providers that detect
    /// connectivity themselves ignore it.
    fn set_reachable(&self, _reachable: bool) {}
}

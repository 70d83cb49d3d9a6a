//! # Persistent-Socket Provider
//!
//! One long-lived connection carrying correlated requests, head
//! subscriptions and framed light-protocol messages. When the connection
//! drops the provider reports `Syncing`, reconnects with jittered
//! exponential backoff, and reports `Synced` again on the first successful
//! response after reconnecting.

use super::session::Session;
use crate::algorithms::Backoff;
use crate::config::SyncerConfig;
use crate::domain::{
    CallRequest, Log, LogFilter, RpcRequest, RpcValue, SyncerError, SyncerEvent,
    TransactionReceipt,
};
use crate::ports::{EventSink, RpcClient, SocketEvent, SocketFrame, SocketTransport, Syncer};
use async_trait::async_trait;
use lc_01_rlp_codec::RlpConfig;
use lc_02_wire_messages::{unframe_with, Decoded, WireMessage};
use parking_lot::Mutex;
use shared_types::{Address, Hash, NotSyncedReason, SyncState, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

type Pending = Mutex<HashMap<u64, oneshot::Sender<Result<RpcValue, SyncerError>>>>;

/// Request/response correlation over the socket.
struct SocketRpc {
    transport: Arc<dyn SocketTransport>,
    pending: Pending,
    next_id: AtomicU64,
    connected: AtomicBool,
}

/// Removes a pending entry when its caller goes away.
struct PendingSlot<'a> {
    pending: &'a Pending,
    id: u64,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

impl SocketRpc {
    fn complete(&self, id: u64, result: Result<RpcValue, SyncerError>) -> bool {
        match self.pending.lock().remove(&id) {
            Some(tx) => tx.send(result).is_ok(),
            None => {
                debug!(id, "[lc-03] response for unknown or abandoned request");
                false
            }
        }
    }

    fn fail_all(&self, error: SyncerError) {
        let drained: Vec<_> = self.pending.lock().drain().collect();
        for (_, tx) in drained {
            let _ = tx.send(Err(error.clone()));
        }
    }
}

#[async_trait]
impl RpcClient for SocketRpc {
    async fn call(&self, request: RpcRequest) -> Result<RpcValue, SyncerError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(SyncerError::Connectivity("socket not connected".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        let _slot = PendingSlot {
            pending: &self.pending,
            id,
        };
        self.transport
            .send(SocketFrame::Request { id, request })
            .await?;
        rx.await.unwrap_or(Err(SyncerError::Cancelled))
    }
}

struct SocketShared {
    transport: Arc<dyn SocketTransport>,
    config: SyncerConfig,
    rlp: RlpConfig,
    session: Session,
    rpc: SocketRpc,
}

enum Pump {
    Disconnected,
    Closed,
}

impl SocketShared {
    fn spawn_refresh(self: &Arc<Self>, generation: u64) {
        let shared = self.clone();
        tokio::spawn(async move {
            match shared.session.refresh(&shared.rpc, generation).await {
                Ok(_) => shared.session.report(generation, SyncState::Synced),
                Err(err) => debug!(error = %err, "[lc-03] refresh after connect failed"),
            }
        });
    }

    fn spawn_balance_refresh(self: &Arc<Self>, generation: u64) {
        let Some(address) = self.session.address() else {
            return;
        };
        let shared = self.clone();
        tokio::spawn(async move {
            if let Err(err) = shared
                .session
                .refresh_balance(&shared.rpc, address, generation)
                .await
            {
                debug!(error = %err, "[lc-03] balance refresh on new head failed");
            }
        });
    }

    fn on_new_head(self: &Arc<Self>, generation: u64, height: u64) {
        trace!(height, "[lc-03] new head");
        self.session.emit(generation, SyncerEvent::Height(height));
        self.spawn_balance_refresh(generation);
    }

    fn on_wire(self: &Arc<Self>, generation: u64, bytes: &[u8]) {
        match unframe_with(bytes, &self.rlp) {
            Ok(Decoded::Message(WireMessage::BlockHeaders(msg))) => {
                trace!(
                    request_id = msg.request_id,
                    buffer_value = msg.buffer_value,
                    count = msg.headers.len(),
                    "[lc-03] block headers"
                );
                // A response may cover an older range; only a higher
                // number is a new head
                match msg.highest_number() {
                    Some(height) if self.session.is_past_head(height) => {
                        self.on_new_head(generation, height);
                    }
                    Some(height) => trace!(height, "[lc-03] headers behind head"),
                    None => {}
                }
            }
            Ok(Decoded::Message(WireMessage::Announce(msg))) => {
                self.on_new_head(generation, msg.head_number);
            }
            Ok(Decoded::Message(other)) => {
                trace!(code = %other.code(), "[lc-03] ignoring message");
            }
            Ok(Decoded::Unrecognized(code)) => {
                debug!(code, "[lc-03] ignoring unrecognized message");
            }
            Err(err) => {
                warn!(error = %err, len = bytes.len(), "[lc-03] dropping malformed frame");
            }
        }
    }

    async fn pump(
        self: &Arc<Self>,
        generation: u64,
        events: &mut mpsc::UnboundedReceiver<SocketEvent>,
        backoff: &mut Backoff,
    ) -> Pump {
        while let Some(event) = events.recv().await {
            if !self.session.is_current(generation) {
                return Pump::Closed;
            }
            match event {
                SocketEvent::Connected => {
                    info!("[lc-03] socket connected");
                    self.rpc.connected.store(true, Ordering::Release);
                    backoff.reset();
                    self.spawn_refresh(generation);
                }
                SocketEvent::Disconnected(reason) => {
                    warn!(%reason, "[lc-03] socket disconnected");
                    self.rpc.connected.store(false, Ordering::Release);
                    self.rpc.fail_all(SyncerError::Connectivity(reason));
                    self.session.report(generation, SyncState::Syncing(None));
                    return Pump::Disconnected;
                }
                SocketEvent::Frame(SocketFrame::Response { id, result }) => {
                    let ok = result.is_ok();
                    if self.rpc.complete(id, result) && ok {
                        self.session.report(generation, SyncState::Synced);
                    }
                }
                SocketEvent::Frame(SocketFrame::NewHead(height)) => {
                    self.on_new_head(generation, height);
                }
                SocketEvent::Frame(SocketFrame::Wire(bytes)) => {
                    self.on_wire(generation, &bytes);
                }
                SocketEvent::Frame(SocketFrame::Request { id, .. }) => {
                    debug!(id, "[lc-03] ignoring inbound request");
                }
            }
        }
        Pump::Closed
    }
}

async fn run(
    shared: Arc<SocketShared>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<SocketEvent>,
) {
    let mut backoff = Backoff::new(shared.config.reconnect_base(), shared.config.reconnect_max());
    loop {
        if !shared.session.is_current(generation) {
            return;
        }
        match shared.transport.connect().await {
            Ok(()) => match shared.pump(generation, &mut events, &mut backoff).await {
                Pump::Disconnected => {}
                Pump::Closed => {
                    if shared.session.is_current(generation) {
                        shared.session.report(
                            generation,
                            SyncState::NotSynced(NotSyncedReason::Connectivity(
                                "transport closed".to_string(),
                            )),
                        );
                    }
                    return;
                }
            },
            Err(err) => {
                warn!(error = %err, attempt = backoff.failures() + 1, "[lc-03] connect failed");
                shared.session.report(generation, SyncState::Syncing(None));
            }
        }
        let delay = backoff.next_jittered(&mut rand::thread_rng());
        info!(
            delay_ms = delay.as_millis() as u64,
            attempt = backoff.failures(),
            "[lc-03] reconnecting"
        );
        tokio::time::sleep(delay).await;
    }
}

/// Provider over one persistent bidirectional connection.
pub struct SocketSyncer {
    shared: Arc<SocketShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SocketSyncer {
    /// Create a provider speaking through `transport`.
    pub fn new(transport: Arc<dyn SocketTransport>, config: SyncerConfig, rlp: RlpConfig) -> Self {
        let session = Session::new(config.request_timeout());
        Self {
            shared: Arc::new(SocketShared {
                rpc: SocketRpc {
                    transport: transport.clone(),
                    pending: Mutex::new(HashMap::new()),
                    next_id: AtomicU64::new(0),
                    connected: AtomicBool::new(false),
                },
                transport,
                config,
                rlp,
                session,
            }),
            task: Mutex::new(None),
        }
    }

    /// True while the socket is up.
    pub fn is_connected(&self) -> bool {
        self.shared.rpc.connected.load(Ordering::Acquire)
    }

    fn abort_task(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for SocketSyncer {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[async_trait]
impl Syncer for SocketSyncer {
    async fn start(&self, address: Address, sink: EventSink) -> Result<(), SyncerError> {
        self.abort_task();
        let events = self.shared.transport.subscribe();
        let generation = self.shared.session.begin(address, sink);
        info!(?address, generation, "[lc-03] socket syncer started");
        self.shared
            .session
            .report(generation, SyncState::Syncing(None));
        let handle = tokio::spawn(run(self.shared.clone(), generation, events));
        *self.task.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self) {
        self.shared.session.end();
        self.abort_task();
        self.shared.rpc.connected.store(false, Ordering::Release);
        self.shared.rpc.fail_all(SyncerError::Cancelled);
        self.shared.transport.close().await;
        info!("[lc-03] socket syncer stopped");
    }

    async fn refresh(&self) -> Result<(), SyncerError> {
        if !self.shared.session.is_active() {
            return Err(SyncerError::NotStarted);
        }
        let generation = self.shared.session.generation();
        self.shared
            .session
            .refresh(&self.shared.rpc, generation)
            .await
            .map(|_| ())
    }

    async fn fetch_balance(&self, address: Address) -> Result<U256, SyncerError> {
        self.shared
            .session
            .fetch_balance(&self.shared.rpc, address)
            .await
    }

    async fn fetch_height(&self) -> Result<u64, SyncerError> {
        self.shared.session.fetch_height(&self.shared.rpc).await
    }

    async fn fetch_nonce(&self, address: Address) -> Result<u64, SyncerError> {
        self.shared
            .session
            .fetch_nonce(&self.shared.rpc, address)
            .await
    }

    async fn fetch_logs(&self, filter: LogFilter) -> Result<Vec<Log>, SyncerError> {
        self.shared.session.fetch_logs(&self.shared.rpc, filter).await
    }

    async fn fetch_receipt(&self, hash: Hash) -> Result<Option<TransactionReceipt>, SyncerError> {
        self.shared
            .session
            .fetch_receipt(&self.shared.rpc, hash)
            .await
    }

    async fn submit(&self, signed: Vec<u8>) -> Result<Hash, SyncerError> {
        self.shared.session.submit(&self.shared.rpc, signed).await
    }

    async fn estimate_gas(&self, call: CallRequest) -> Result<u64, SyncerError> {
        self.shared
            .session
            .estimate_gas(&self.shared.rpc, call)
            .await
    }

    fn sync_state(&self) -> SyncState {
        self.shared.session.sync_state()
    }
}

//! # Outbound Ports
//!
//! Transport collaborators the providers talk through, plus in-memory
//! doubles for every port in this crate. The doubles are public so the
//! state machine, the transaction pipeline and the wallet can reuse them.

use super::inbound::{EventSink, Syncer};
use crate::domain::{
    CallRequest, Log, LogFilter, RpcRequest, RpcValue, SyncerError, SyncerEvent,
    TransactionReceipt,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{keccak256, Address, Hash, SyncState, U256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// Remote-procedure collaborator.
///
/// Implementations own serialization and HTTP plumbing; the syncer only
/// sees typed requests and deserialized values.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Perform one call.
    async fn call(&self, request: RpcRequest) -> Result<RpcValue, SyncerError>;
}

/// A frame on the persistent socket, already split from its envelope.
#[derive(Clone, Debug, PartialEq)]
pub enum SocketFrame {
    /// Outgoing call, correlated by `id`.
    Request {
        /// Correlation id.
        id: u64,
        /// The call.
        request: RpcRequest,
    },
    /// Answer to an earlier `Request`.
    Response {
        /// Correlation id of the request.
        id: u64,
        /// Result or provider error.
        result: Result<RpcValue, SyncerError>,
    },
    /// Subscription push: a new head at this height.
    NewHead(u64),
    /// A framed light-protocol message (`RLP(code) ‖ RLP(body)`).
    Wire(Vec<u8>),
}

/// Connection lifecycle and inbound traffic.
#[derive(Clone, Debug, PartialEq)]
pub enum SocketEvent {
    /// The connection is up.
    Connected,
    /// The connection dropped.
    Disconnected(String),
    /// A frame arrived.
    Frame(SocketFrame),
}

/// Persistent-socket collaborator.
#[async_trait]
pub trait SocketTransport: Send + Sync {
    /// Register for lifecycle events and inbound frames. A new registration
    /// replaces the previous one.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SocketEvent>;

    /// Open the connection. Success is followed by `SocketEvent::Connected`.
    async fn connect(&self) -> Result<(), SyncerError>;

    /// Send one frame.
    async fn send(&self, frame: SocketFrame) -> Result<(), SyncerError>;

    /// Close the connection without emitting `Disconnected`.
    async fn close(&self);
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Canned chain data behind `MockRpcClient`.
#[derive(Debug, Default)]
pub struct MockChain {
    /// Head height.
    pub height: u64,
    /// Balances by account.
    pub balances: HashMap<Address, U256>,
    /// Nonces by account.
    pub nonces: HashMap<Address, u64>,
    /// Receipts by transaction hash.
    pub receipts: HashMap<Hash, TransactionReceipt>,
    /// All known logs.
    pub logs: Vec<Log>,
    /// Answer to every gas estimate.
    pub gas_estimate: u64,
    /// While set, every call fails with this error.
    pub failure: Option<SyncerError>,
    /// While set, `SendRawTransaction` fails with this error.
    pub submit_error: Option<SyncerError>,
    /// Every call received, in order.
    pub calls: Vec<RpcRequest>,
}

/// In-memory remote-procedure provider.
#[derive(Debug, Default)]
pub struct MockRpcClient {
    chain: Mutex<MockChain>,
    delay: Mutex<Option<Duration>>,
}

impl MockRpcClient {
    /// Empty chain at height 0 with a 21000 gas estimate.
    pub fn new() -> Self {
        let client = Self::default();
        client.chain.lock().gas_estimate = 21_000;
        client
    }

    /// Mutate the canned chain.
    pub fn with_chain<R>(&self, f: impl FnOnce(&mut MockChain) -> R) -> R {
        f(&mut self.chain.lock())
    }

    /// Set the head height.
    pub fn set_height(&self, height: u64) {
        self.chain.lock().height = height;
    }

    /// Set the balance of `address`.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.chain.lock().balances.insert(address, balance);
    }

    /// Set the nonce of `address`.
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.chain.lock().nonces.insert(address, nonce);
    }

    /// Make every call fail with `error`, or clear the failure.
    pub fn fail_with(&self, error: Option<SyncerError>) {
        self.chain.lock().failure = error;
    }

    /// Delay every answer. The call is recorded before the delay.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RpcRequest> {
        self.chain.lock().calls.clone()
    }

    /// Calls received so far for one method.
    pub fn call_count(&self, method: &str) -> usize {
        self.chain
            .lock()
            .calls
            .iter()
            .filter(|c| c.method() == method)
            .count()
    }

    /// Answer `request` immediately, recording it.
    pub fn respond(&self, request: &RpcRequest) -> Result<RpcValue, SyncerError> {
        self.record(request);
        self.answer(request)
    }

    fn record(&self, request: &RpcRequest) {
        self.chain.lock().calls.push(request.clone());
    }

    fn answer(&self, request: &RpcRequest) -> Result<RpcValue, SyncerError> {
        let chain = self.chain.lock();
        if let Some(err) = &chain.failure {
            return Err(err.clone());
        }
        let value = match request {
            RpcRequest::BlockNumber => RpcValue::Quantity(U256::from(chain.height)),
            RpcRequest::GetBalance(address) => {
                RpcValue::Quantity(chain.balances.get(address).copied().unwrap_or_default())
            }
            RpcRequest::GetTransactionCount(address) => {
                RpcValue::Quantity(U256::from(chain.nonces.get(address).copied().unwrap_or(0)))
            }
            RpcRequest::GetLogs(filter) => RpcValue::Logs(
                chain
                    .logs
                    .iter()
                    .filter(|log| filter.matches(log))
                    .cloned()
                    .collect(),
            ),
            RpcRequest::GetTransactionReceipt(hash) => {
                RpcValue::Receipt(chain.receipts.get(hash).cloned())
            }
            RpcRequest::SendRawTransaction(raw) => {
                if let Some(err) = &chain.submit_error {
                    return Err(err.clone());
                }
                RpcValue::Hash(keccak256(raw))
            }
            RpcRequest::EstimateGas(_) => RpcValue::Quantity(U256::from(chain.gas_estimate)),
        };
        Ok(value)
    }
}

#[async_trait]
impl RpcClient for MockRpcClient {
    async fn call(&self, request: RpcRequest) -> Result<RpcValue, SyncerError> {
        // Recorded at issue time so coalescing is observable.
        self.record(&request);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(&request)
    }
}

#[derive(Debug, Default)]
struct MockSocketState {
    events: Option<mpsc::UnboundedSender<SocketEvent>>,
    refuse: bool,
    manual: bool,
    connected: bool,
    connect_attempts: u32,
    sent: Vec<SocketFrame>,
}

/// In-memory persistent socket.
///
/// Requests are answered by the wrapped `MockRpcClient` unless manual mode
/// is on, in which case tests push responses themselves.
#[derive(Debug)]
pub struct MockSocketTransport {
    responder: std::sync::Arc<MockRpcClient>,
    state: Mutex<MockSocketState>,
}

impl MockSocketTransport {
    /// Socket answering from `responder`.
    pub fn new(responder: std::sync::Arc<MockRpcClient>) -> Self {
        Self {
            responder,
            state: Mutex::new(MockSocketState::default()),
        }
    }

    /// The chain answering requests.
    pub fn responder(&self) -> &MockRpcClient {
        &self.responder
    }

    /// Refuse (or accept) future connection attempts.
    pub fn set_refusing(&self, refuse: bool) {
        self.state.lock().refuse = refuse;
    }

    /// Stop answering requests automatically.
    pub fn set_manual(&self, manual: bool) {
        self.state.lock().manual = manual;
    }

    /// Drop the connection from the remote side.
    pub fn drop_connection(&self, reason: &str) {
        let mut state = self.state.lock();
        state.connected = false;
        if let Some(events) = &state.events {
            let _ = events.send(SocketEvent::Disconnected(reason.to_string()));
        }
    }

    /// Deliver an inbound frame.
    pub fn push_frame(&self, frame: SocketFrame) {
        if let Some(events) = &self.state.lock().events {
            let _ = events.send(SocketEvent::Frame(frame));
        }
    }

    /// Connection attempts so far.
    pub fn connect_attempts(&self) -> u32 {
        self.state.lock().connect_attempts
    }

    /// True while connected.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Frames sent so far.
    pub fn sent_frames(&self) -> Vec<SocketFrame> {
        self.state.lock().sent.clone()
    }

    /// Requests sent so far for one method.
    pub fn sent_count(&self, method: &str) -> usize {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|f| matches!(f, SocketFrame::Request { request, .. } if request.method() == method))
            .count()
    }
}

#[async_trait]
impl SocketTransport for MockSocketTransport {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SocketEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().events = Some(tx);
        rx
    }

    async fn connect(&self) -> Result<(), SyncerError> {
        let mut state = self.state.lock();
        state.connect_attempts += 1;
        if state.refuse {
            return Err(SyncerError::Connectivity("connection refused".to_string()));
        }
        state.connected = true;
        if let Some(events) = &state.events {
            let _ = events.send(SocketEvent::Connected);
        }
        Ok(())
    }

    async fn send(&self, frame: SocketFrame) -> Result<(), SyncerError> {
        let mut state = self.state.lock();
        if !state.connected {
            return Err(SyncerError::Connectivity("not connected".to_string()));
        }
        state.sent.push(frame.clone());
        if let (false, SocketFrame::Request { id, request }) = (state.manual, &frame) {
            let result = self.responder.respond(request);
            if let Some(events) = &state.events {
                let _ = events.send(SocketEvent::Frame(SocketFrame::Response { id: *id, result }));
            }
        }
        Ok(())
    }

    async fn close(&self) {
        self.state.lock().connected = false;
    }
}

#[derive(Debug, Default)]
struct MockSyncerState {
    sink: Option<EventSink>,
    address: Option<Address>,
    starts: u32,
    stops: u32,
    refreshes: u32,
    height: u64,
    balance: U256,
    nonce: u64,
    nonce_fetches: u32,
    receipts: HashMap<Hash, TransactionReceipt>,
    receipt_queries: Vec<Hash>,
    read_error: Option<SyncerError>,
    submit_error: Option<SyncerError>,
    submitted: Vec<Vec<u8>>,
    gas_estimate: u64,
    estimates: Vec<CallRequest>,
    sync_state: SyncState,
}

/// Scriptable syncer for consumers of the `Syncer` port.
///
/// Nothing is pushed on its own; tests call `emit`, and `refresh` pushes the
/// canned height and balance.
#[derive(Debug)]
pub struct MockSyncer {
    state: Mutex<MockSyncerState>,
}

impl Default for MockSyncer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSyncer {
    /// Idle syncer with a 21000 gas estimate.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockSyncerState {
                gas_estimate: 21_000,
                ..Default::default()
            }),
        }
    }

    /// Push an event to the current sink. `false` if not started.
    pub fn emit(&self, event: SyncerEvent) -> bool {
        let mut state = self.state.lock();
        if let SyncerEvent::SyncState(s) = &event {
            state.sync_state = s.clone();
        }
        state
            .sink
            .as_ref()
            .is_some_and(|sink| sink.send(event).is_ok())
    }

    /// Height returned by `fetch_height` and pushed by `refresh`.
    pub fn set_height(&self, height: u64) {
        self.state.lock().height = height;
    }

    /// Balance returned by `fetch_balance` and pushed by `refresh`.
    pub fn set_balance(&self, balance: U256) {
        self.state.lock().balance = balance;
    }

    /// Nonce returned by `fetch_nonce`.
    pub fn set_nonce(&self, nonce: u64) {
        self.state.lock().nonce = nonce;
    }

    /// Gas returned by `estimate_gas`.
    pub fn set_gas_estimate(&self, gas: u64) {
        self.state.lock().gas_estimate = gas;
    }

    /// Make `hash` included.
    pub fn add_receipt(&self, receipt: TransactionReceipt) {
        self.state
            .lock()
            .receipts
            .insert(receipt.transaction_hash, receipt);
    }

    /// Fail every fetch with `error`, or clear the failure.
    pub fn fail_reads(&self, error: Option<SyncerError>) {
        self.state.lock().read_error = error;
    }

    /// Fail every `submit` with `error`, or clear the failure.
    pub fn reject_submissions(&self, error: Option<SyncerError>) {
        self.state.lock().submit_error = error;
    }

    /// Number of `start` calls.
    pub fn start_count(&self) -> u32 {
        self.state.lock().starts
    }

    /// Number of `stop` calls.
    pub fn stop_count(&self) -> u32 {
        self.state.lock().stops
    }

    /// Number of `refresh` calls.
    pub fn refresh_count(&self) -> u32 {
        self.state.lock().refreshes
    }

    /// Number of `fetch_nonce` calls.
    pub fn nonce_fetches(&self) -> u32 {
        self.state.lock().nonce_fetches
    }

    /// Hashes passed to `fetch_receipt`, in order.
    pub fn receipt_queries(&self) -> Vec<Hash> {
        self.state.lock().receipt_queries.clone()
    }

    /// Payloads passed to `submit`, in order.
    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.state.lock().submitted.clone()
    }

    /// Calls passed to `estimate_gas`, in order.
    pub fn estimates(&self) -> Vec<CallRequest> {
        self.state.lock().estimates.clone()
    }

    /// Address passed to the last `start`.
    pub fn tracked_address(&self) -> Option<Address> {
        self.state.lock().address
    }

    /// True between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.state.lock().sink.is_some()
    }

    fn read<T>(&self, f: impl FnOnce(&mut MockSyncerState) -> T) -> Result<T, SyncerError> {
        let mut state = self.state.lock();
        match &state.read_error {
            Some(err) => Err(err.clone()),
            None => Ok(f(&mut state)),
        }
    }
}

#[async_trait]
impl Syncer for MockSyncer {
    async fn start(&self, address: Address, sink: EventSink) -> Result<(), SyncerError> {
        let mut state = self.state.lock();
        state.starts += 1;
        state.address = Some(address);
        state.sink = Some(sink);
        Ok(())
    }

    async fn stop(&self) {
        let mut state = self.state.lock();
        state.stops += 1;
        state.sink = None;
        state.sync_state = SyncState::default();
    }

    async fn refresh(&self) -> Result<(), SyncerError> {
        let (height, balance) = {
            let mut state = self.state.lock();
            state.refreshes += 1;
            if let Some(err) = &state.read_error {
                return Err(err.clone());
            }
            (state.height, state.balance)
        };
        self.emit(SyncerEvent::Height(height));
        self.emit(SyncerEvent::Balance(balance));
        Ok(())
    }

    async fn fetch_balance(&self, _address: Address) -> Result<U256, SyncerError> {
        self.read(|s| s.balance)
    }

    async fn fetch_height(&self) -> Result<u64, SyncerError> {
        self.read(|s| s.height)
    }

    async fn fetch_nonce(&self, _address: Address) -> Result<u64, SyncerError> {
        self.state.lock().nonce_fetches += 1;
        self.read(|s| s.nonce)
    }

    async fn fetch_logs(&self, _filter: LogFilter) -> Result<Vec<Log>, SyncerError> {
        self.read(|_| Vec::new())
    }

    async fn fetch_receipt(&self, hash: Hash) -> Result<Option<TransactionReceipt>, SyncerError> {
        self.read(|s| {
            s.receipt_queries.push(hash);
            s.receipts.get(&hash).cloned()
        })
    }

    async fn submit(&self, signed: Vec<u8>) -> Result<Hash, SyncerError> {
        let mut state = self.state.lock();
        if let Some(err) = &state.submit_error {
            return Err(err.clone());
        }
        let hash = keccak256(&signed);
        state.submitted.push(signed);
        Ok(hash)
    }

    async fn estimate_gas(&self, call: CallRequest) -> Result<u64, SyncerError> {
        let mut state = self.state.lock();
        state.estimates.push(call);
        Ok(state.gas_estimate)
    }

    fn sync_state(&self) -> SyncState {
        self.state.lock().sync_state.clone()
    }
}

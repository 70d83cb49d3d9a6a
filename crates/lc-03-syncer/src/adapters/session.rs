//! # Session
//!
//! State shared by both providers for one started cycle: the event sink,
//! the generation that fences off stale responses, per-resource
//! single-flight guards and the deduplicating sync-state reporter.

use crate::algorithms::{Generation, InFlight, SyncStateReporter};
use crate::domain::{
    CallRequest, Log, LogFilter, RpcRequest, RpcValue, SyncerError, SyncerEvent,
    TransactionReceipt,
};
use crate::ports::{EventSink, RpcClient};
use parking_lot::Mutex;
use shared_types::{Address, Hash, SyncState, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, trace};

/// Result of a refresh that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
    /// At least one resource was fetched.
    Completed,
    /// Every resource already had a fetch outstanding.
    Coalesced,
}

pub(crate) struct Session {
    generation: Generation,
    sink: Mutex<Option<EventSink>>,
    address: Mutex<Option<Address>>,
    reporter: Mutex<SyncStateReporter>,
    height_flight: InFlight,
    balance_flight: InFlight,
    /// Highest height delivered in the current cycle.
    head: AtomicU64,
    cancel: Notify,
    request_timeout: Duration,
}

impl Session {
    pub(crate) fn new(request_timeout: Duration) -> Self {
        Self {
            generation: Generation::default(),
            sink: Mutex::new(None),
            address: Mutex::new(None),
            reporter: Mutex::new(SyncStateReporter::default()),
            height_flight: InFlight::default(),
            balance_flight: InFlight::default(),
            head: AtomicU64::new(0),
            cancel: Notify::new(),
            request_timeout,
        }
    }

    /// Open a new cycle, superseding any previous one.
    pub(crate) fn begin(&self, address: Address, sink: EventSink) -> u64 {
        let mut slot = self.sink.lock();
        let generation = self.generation.advance();
        self.head.store(0, Ordering::Release);
        *slot = Some(sink);
        *self.address.lock() = Some(address);
        generation
    }

    /// Close the current cycle. Outstanding refreshes resolve as cancelled
    /// and nothing more reaches the old sink.
    pub(crate) fn end(&self) {
        {
            let mut slot = self.sink.lock();
            self.generation.advance();
            *slot = None;
        }
        *self.address.lock() = None;
        self.reporter.lock().observe(SyncState::default());
        self.cancel.notify_waiters();
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.is_current(generation)
    }

    /// True between `begin` and `end`.
    pub(crate) fn is_active(&self) -> bool {
        self.sink.lock().is_some()
    }

    pub(crate) fn address(&self) -> Option<Address> {
        *self.address.lock()
    }

    pub(crate) fn sync_state(&self) -> SyncState {
        self.reporter.lock().current().clone()
    }

    /// True if `height` is above every height delivered this cycle.
    pub(crate) fn is_past_head(&self, height: u64) -> bool {
        height > self.head.load(Ordering::Acquire)
    }

    /// Deliver `event` if `generation` is still the live cycle.
    pub(crate) fn emit(&self, generation: u64, event: SyncerEvent) -> bool {
        let slot = self.sink.lock();
        if !self.generation.is_current(generation) {
            trace!(generation, ?event, "[lc-03] dropping event from stale cycle");
            return false;
        }
        let Some(sink) = slot.as_ref() else {
            return false;
        };
        if let SyncerEvent::Height(height) = &event {
            self.head.fetch_max(*height, Ordering::AcqRel);
        }
        sink.send(event).is_ok()
    }

    /// Report a sync-state transition, suppressing consecutive duplicates.
    pub(crate) fn report(&self, generation: u64, state: SyncState) {
        if !self.is_current(generation) {
            return;
        }
        let mut reporter = self.reporter.lock();
        if reporter.observe(state.clone()) {
            info!(state = %state, "[lc-03] sync state changed");
            self.emit(generation, SyncerEvent::SyncState(state));
        } else {
            trace!(state = %state, "[lc-03] duplicate sync state suppressed");
        }
    }

    /// Fetch height and balance, emitting whatever arrives while the cycle
    /// is live. Resolves as `Cancelled` if the cycle ends first.
    pub(crate) async fn refresh(
        &self,
        client: &dyn RpcClient,
        generation: u64,
    ) -> Result<RefreshOutcome, SyncerError> {
        let address = self.address().ok_or(SyncerError::NotStarted)?;
        let cancelled = self.cancel.notified();
        if !self.is_current(generation) {
            return Err(SyncerError::Cancelled);
        }
        let work = async {
            let (height, balance) = tokio::join!(
                self.refresh_height(client, generation),
                self.refresh_balance(client, address, generation)
            );
            match (height?, balance?) {
                (RefreshOutcome::Coalesced, RefreshOutcome::Coalesced) => {
                    Ok(RefreshOutcome::Coalesced)
                }
                _ => Ok(RefreshOutcome::Completed),
            }
        };
        tokio::select! {
            result = work => result,
            _ = cancelled => Err(SyncerError::Cancelled),
        }
    }

    pub(crate) async fn refresh_height(
        &self,
        client: &dyn RpcClient,
        generation: u64,
    ) -> Result<RefreshOutcome, SyncerError> {
        let Some(_guard) = self.height_flight.try_begin() else {
            debug!("[lc-03] height refresh coalesced");
            return Ok(RefreshOutcome::Coalesced);
        };
        let height = self.fetch_height(client).await?;
        self.emit(generation, SyncerEvent::Height(height));
        Ok(RefreshOutcome::Completed)
    }

    pub(crate) async fn refresh_balance(
        &self,
        client: &dyn RpcClient,
        address: Address,
        generation: u64,
    ) -> Result<RefreshOutcome, SyncerError> {
        let Some(_guard) = self.balance_flight.try_begin() else {
            debug!("[lc-03] balance refresh coalesced");
            return Ok(RefreshOutcome::Coalesced);
        };
        let balance = self.fetch_balance(client, address).await?;
        self.emit(generation, SyncerEvent::Balance(balance));
        Ok(RefreshOutcome::Completed)
    }

    async fn call(&self, client: &dyn RpcClient, request: RpcRequest) -> Result<RpcValue, SyncerError> {
        let method = request.method();
        trace!(method, "[lc-03] remote call");
        match tokio::time::timeout(self.request_timeout, client.call(request)).await {
            Ok(result) => result,
            Err(_) => {
                debug!(method, timeout_ms = self.request_timeout.as_millis() as u64, "[lc-03] call timed out");
                Err(SyncerError::Timeout(self.request_timeout))
            }
        }
    }

    pub(crate) async fn fetch_height(&self, client: &dyn RpcClient) -> Result<u64, SyncerError> {
        self.call(client, RpcRequest::BlockNumber).await?.into_u64()
    }

    pub(crate) async fn fetch_balance(
        &self,
        client: &dyn RpcClient,
        address: Address,
    ) -> Result<U256, SyncerError> {
        self.call(client, RpcRequest::GetBalance(address))
            .await?
            .into_u256()
    }

    pub(crate) async fn fetch_nonce(
        &self,
        client: &dyn RpcClient,
        address: Address,
    ) -> Result<u64, SyncerError> {
        self.call(client, RpcRequest::GetTransactionCount(address))
            .await?
            .into_u64()
    }

    pub(crate) async fn fetch_logs(
        &self,
        client: &dyn RpcClient,
        filter: LogFilter,
    ) -> Result<Vec<Log>, SyncerError> {
        self.call(client, RpcRequest::GetLogs(filter)).await?.into_logs()
    }

    pub(crate) async fn fetch_receipt(
        &self,
        client: &dyn RpcClient,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, SyncerError> {
        self.call(client, RpcRequest::GetTransactionReceipt(hash))
            .await?
            .into_receipt()
    }

    pub(crate) async fn submit(
        &self,
        client: &dyn RpcClient,
        signed: Vec<u8>,
    ) -> Result<Hash, SyncerError> {
        let hash = self
            .call(client, RpcRequest::SendRawTransaction(signed))
            .await?
            .into_hash()?;
        info!(tx_hash = ?hash, "[lc-03] transaction submitted");
        Ok(hash)
    }

    pub(crate) async fn estimate_gas(
        &self,
        client: &dyn RpcClient,
        call: CallRequest,
    ) -> Result<u64, SyncerError> {
        self.call(client, RpcRequest::EstimateGas(call))
            .await?
            .into_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{event_channel, MockRpcClient};
    use shared_types::NotSyncedReason;

    #[tokio::test]
    async fn test_stale_generation_is_inert() {
        let session = Session::new(Duration::from_secs(1));
        let (sink, mut stream) = event_channel();
        let first = session.begin(Address::zero(), sink);
        assert!(session.emit(first, SyncerEvent::Height(1)));

        let (sink, _stream2) = event_channel();
        let second = session.begin(Address::zero(), sink);
        assert!(!session.emit(first, SyncerEvent::Height(2)));
        assert!(session.is_current(second));

        assert_eq!(stream.recv().await, Some(SyncerEvent::Height(1)));
        // old sink was replaced and dropped
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test]
    async fn test_report_deduplicates() {
        let session = Session::new(Duration::from_secs(1));
        let (sink, mut stream) = event_channel();
        let generation = session.begin(Address::zero(), sink);

        session.report(generation, SyncState::Syncing(None));
        session.report(generation, SyncState::Syncing(None));
        session.report(generation, SyncState::NotSynced(NotSyncedReason::NoConnection));
        session.report(
            generation,
            SyncState::NotSynced(NotSyncedReason::Connectivity("again".into())),
        );
        session.end();

        let mut got = Vec::new();
        while let Some(event) = stream.recv().await {
            got.push(event);
        }
        assert_eq!(
            got,
            vec![
                SyncerEvent::SyncState(SyncState::Syncing(None)),
                SyncerEvent::SyncState(SyncState::NotSynced(NotSyncedReason::NoConnection)),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refresh_is_coalesced() {
        let client = MockRpcClient::new();
        client.set_delay(Some(Duration::from_millis(200)));
        let session = Session::new(Duration::from_secs(5));
        let (sink, _stream) = event_channel();
        let generation = session.begin(Address::repeat_byte(1), sink);

        let (a, b) = tokio::join!(
            session.refresh(&client, generation),
            session.refresh(&client, generation)
        );
        let mut outcomes = vec![a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| *o == RefreshOutcome::Completed);
        assert_eq!(
            outcomes,
            vec![RefreshOutcome::Coalesced, RefreshOutcome::Completed]
        );
        assert_eq!(client.call_count("eth_blockNumber"), 1);
        assert_eq!(client.call_count("eth_getBalance"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_cancels_refresh() {
        let client = MockRpcClient::new();
        client.set_delay(Some(Duration::from_secs(10)));
        let session = Session::new(Duration::from_secs(60));
        let (sink, mut stream) = event_channel();
        let generation = session.begin(Address::zero(), sink);

        let refresh = session.refresh(&client, generation);
        let stop = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            session.end();
        };
        let (result, ()) = tokio::join!(refresh, stop);
        assert_eq!(result, Err(SyncerError::Cancelled));
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout() {
        let client = MockRpcClient::new();
        client.set_delay(Some(Duration::from_secs(10)));
        let session = Session::new(Duration::from_secs(2));
        assert_eq!(
            session.fetch_height(&client).await,
            Err(SyncerError::Timeout(Duration::from_secs(2)))
        );
    }
}

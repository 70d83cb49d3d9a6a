//! # Blockchain State Machine
//!
//! Owns the tracked account's `AccountState`, its `SyncState` and its
//! transaction history. Consumes events from the active syncer and turns
//! them into change notifications on four streams.
//!
//! ## Lifecycle
//!
//! ```text
//!   new ──▶ stopped ──start()──▶ started ──stop()──▶ stopped
//!              ▲                    │
//!              └────── (repeat) ────┘
//! ```
//!
//! `start` and `stop` are idempotent. Each start opens a new generation;
//! events from an earlier generation are discarded. The generation is
//! re-checked under the lock that guards the state an event writes, and
//! `stop` retires it under those same locks, so an event already past the
//! pump cannot land after `stop`.

use crate::config::StateConfig;
use crate::domain::{StateError, TransactionSet};
use crate::ports::StateStorage;
use lc_03_syncer::{
    event_channel, EventStream, Generation, InFlight, Syncer, SyncerEvent, SyncStateReporter,
    TransactionReceipt,
};
use parking_lot::Mutex;
use shared_bus::{StatePublisher, Subscription, UpdateCategory};
use shared_types::{
    AccountState, Address, Hash, NetworkId, NotSyncedReason, SyncState, TransactionRecord,
    TransactionStatus, U256,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// State shared between the public handle and the event pump.
struct Core {
    address: Address,
    network: NetworkId,
    syncer: Arc<dyn Syncer>,
    storage: Arc<dyn StateStorage>,
    account: Mutex<AccountState>,
    sync_state: Mutex<SyncStateReporter>,
    transactions: Mutex<TransactionSet>,
    heights: StatePublisher<u64>,
    balances: StatePublisher<U256>,
    sync_states: StatePublisher<SyncState>,
    transaction_lists: StatePublisher<Vec<TransactionRecord>>,
    generation: Generation,
    started: AtomicBool,
    receipts: InFlight,
}

#[derive(Default)]
struct Lifecycle {
    pump: Option<JoinHandle<()>>,
}

/// Account state for one address on one network.
pub struct BlockchainStateMachine {
    core: Arc<Core>,
    config: StateConfig,
    lifecycle: tokio::sync::Mutex<Lifecycle>,
}

impl BlockchainStateMachine {
    /// Build a stopped state machine, seeded from `storage`.
    ///
    /// Persisted height, balance and history are published immediately so
    /// a subscriber opened before `start` sees the last known values.
    pub fn new(
        address: Address,
        network: NetworkId,
        syncer: Arc<dyn Syncer>,
        storage: Arc<dyn StateStorage>,
        config: StateConfig,
    ) -> Result<Self, StateError> {
        let stored = storage.load(&address, network)?;
        let capacity = config.stream_capacity;
        let core = Core {
            address,
            network,
            syncer,
            storage,
            account: Mutex::new(stored.account.clone()),
            sync_state: Mutex::new(SyncStateReporter::default()),
            transactions: Mutex::new(TransactionSet::from_records(stored.transactions)),
            heights: StatePublisher::with_capacity(UpdateCategory::Height, capacity),
            balances: StatePublisher::with_capacity(UpdateCategory::Balance, capacity),
            sync_states: StatePublisher::with_capacity(UpdateCategory::SyncState, capacity),
            transaction_lists: StatePublisher::with_capacity(
                UpdateCategory::Transactions,
                capacity,
            ),
            generation: Generation::default(),
            started: AtomicBool::new(false),
            receipts: InFlight::default(),
        };

        if let Some(height) = stored.account.last_block_height {
            core.heights.publish(height);
        }
        if let Some(balance) = stored.account.balance {
            core.balances.publish(balance);
        }
        {
            let transactions = core.transactions.lock();
            if !transactions.is_empty() {
                core.transaction_lists
                    .publish(transactions.records().to_vec());
            }
        }

        debug!(
            address = %address,
            network = %network,
            height = ?stored.account.last_block_height,
            "[lc-04] state machine created"
        );

        Ok(Self {
            core: Arc::new(core),
            config,
            lifecycle: tokio::sync::Mutex::new(Lifecycle::default()),
        })
    }

    /// Start tracking. A second call while started does nothing.
    pub async fn start(&self) -> Result<(), StateError> {
        let mut lifecycle = self.lifecycle.lock().await;
        if self.core.started.load(Ordering::Acquire) {
            debug!("[lc-04] start ignored, already started");
            return Ok(());
        }

        let generation = self.core.generation.advance();
        let (sink, events) = event_channel();
        self.core.set_sync_state(SyncState::Syncing(None));

        if let Err(err) = self.core.syncer.start(self.core.address, sink).await {
            warn!(error = %err, "[lc-04] syncer failed to start");
            self.core
                .set_sync_state(SyncState::NotSynced(err.not_synced_reason()));
            return Err(err.into());
        }

        lifecycle.pump = Some(tokio::spawn(pump(
            Arc::clone(&self.core),
            generation,
            events,
        )));
        self.core.started.store(true, Ordering::Release);
        info!(
            address = %self.core.address,
            generation,
            "[lc-04] state machine started"
        );
        Ok(())
    }

    /// Stop tracking and clear the in-memory account state. A second call
    /// while stopped does nothing.
    ///
    /// Persisted values are kept so the next construction can show them.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        if !self.core.started.swap(false, Ordering::AcqRel) {
            debug!("[lc-04] stop ignored, not started");
            return;
        }

        self.core.retire();
        if let Some(pump) = lifecycle.pump.take() {
            pump.abort();
        }
        self.core.syncer.stop().await;

        self.core
            .set_sync_state(SyncState::NotSynced(NotSyncedReason::NotStarted));
        info!(address = %self.core.address, "[lc-04] state machine stopped");
    }

    /// Ask the syncer for a fresh height and balance.
    pub async fn refresh(&self) -> Result<(), StateError> {
        if !self.is_started() {
            return Err(StateError::NotStarted);
        }
        self.core.syncer.refresh().await?;
        Ok(())
    }

    /// True between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.core.started.load(Ordering::Acquire)
    }

    /// Tracked address.
    pub fn address(&self) -> Address {
        self.core.address
    }

    /// Network this state belongs to.
    pub fn network(&self) -> NetworkId {
        self.core.network
    }

    /// Snapshot of height and balance.
    pub fn account_state(&self) -> AccountState {
        self.core.account.lock().clone()
    }

    /// Last known balance.
    pub fn balance(&self) -> Option<U256> {
        self.core.account.lock().balance
    }

    /// Last known block height.
    pub fn last_block_height(&self) -> Option<u64> {
        self.core.account.lock().last_block_height
    }

    /// Current sync state.
    pub fn sync_state(&self) -> SyncState {
        self.core.sync_state.lock().current().clone()
    }

    /// Record a transaction sent by, or observed for, this account.
    pub fn register_transaction(&self, record: TransactionRecord) {
        let hash = record.hash;
        let mut transactions = self.core.transactions.lock();
        if !transactions.insert(record) {
            trace!(hash = %hash, "[lc-04] transaction already known");
            return;
        }
        debug!(hash = %hash, total = transactions.len(), "[lc-04] transaction registered");
        self.core.persist_transactions(&transactions);
        self.core
            .transaction_lists
            .publish(transactions.records().to_vec());
    }

    /// Up to `limit` transactions older than `from_hash`, newest first.
    /// `limit` is capped by the configured page size.
    pub fn transactions(&self, from_hash: Option<Hash>, limit: usize) -> Vec<TransactionRecord> {
        self.core
            .transactions
            .lock()
            .page(from_hash.as_ref(), limit.min(self.config.max_page_size))
    }

    /// Known transaction by hash.
    pub fn transaction(&self, hash: &Hash) -> Option<TransactionRecord> {
        self.core.transactions.lock().get(hash).cloned()
    }

    /// Receipt of `hash` from the network, `None` while pending.
    pub async fn transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, StateError> {
        Ok(self.core.syncer.fetch_receipt(hash).await?)
    }

    /// Network nonce of the tracked account.
    pub async fn transaction_count(&self) -> Result<u64, StateError> {
        Ok(self.core.syncer.fetch_nonce(self.core.address).await?)
    }

    /// Height changes. Opening a new subscription retires the previous one.
    pub fn height_updates(&self) -> Subscription<u64> {
        self.core.heights.subscribe()
    }

    /// Balance changes.
    pub fn balance_updates(&self) -> Subscription<U256> {
        self.core.balances.subscribe()
    }

    /// Sync state transitions.
    pub fn sync_state_updates(&self) -> Subscription<SyncState> {
        self.core.sync_states.subscribe()
    }

    /// Full history snapshots, newest first, on every change.
    pub fn transaction_updates(&self) -> Subscription<Vec<TransactionRecord>> {
        self.core.transaction_lists.subscribe()
    }
}

impl Drop for BlockchainStateMachine {
    fn drop(&mut self) {
        if let Some(pump) = self.lifecycle.get_mut().pump.take() {
            pump.abort();
        }
    }
}

/// Apply syncer events in arrival order until the channel closes or the
/// generation moves on.
async fn pump(core: Arc<Core>, generation: u64, mut events: EventStream) {
    while let Some(event) = events.recv().await {
        if !core.generation.is_current(generation) {
            trace!(generation, "[lc-04] stale event dropped");
            return;
        }
        core.apply(generation, event);
    }
    debug!(generation, "[lc-04] event channel closed");
}

impl Core {
    /// End the current generation and clear the in-memory account.
    ///
    /// Holds every lock an event writes under, so no event of the retired
    /// generation can be half applied.
    fn retire(&self) {
        let mut account = self.account.lock();
        let _transactions = self.transactions.lock();
        let _sync_state = self.sync_state.lock();
        let retired = self.generation.advance() - 1;
        account.clear();
        // A restart reporting the same values must notify again
        self.heights.reset_last();
        self.balances.reset_last();
        trace!(generation = retired, "[lc-04] generation retired");
    }

    fn apply(self: &Arc<Self>, generation: u64, event: SyncerEvent) {
        match event {
            SyncerEvent::Height(height) => self.apply_height(generation, height),
            SyncerEvent::Balance(balance) => self.apply_balance(generation, balance),
            SyncerEvent::SyncState(state) => self.apply_sync_state(generation, state),
        }
    }

    fn apply_height(self: &Arc<Self>, generation: u64, height: u64) {
        {
            let mut account = self.account.lock();
            if !self.generation.is_current(generation) {
                trace!(generation, height, "[lc-04] stale height dropped");
                return;
            }
            // Published under the lock so concurrent writers cannot reorder
            if !self.heights.publish_if_changed(height) {
                return;
            }
            account.last_block_height = Some(height);
            self.persist_account(&account);
        }
        debug!(height, "[lc-04] height updated");
        self.spawn_receipt_check(generation);
    }

    fn apply_balance(&self, generation: u64, balance: U256) {
        let mut account = self.account.lock();
        if !self.generation.is_current(generation) {
            trace!(generation, "[lc-04] stale balance dropped");
            return;
        }
        if !self.balances.publish_if_changed(balance) {
            return;
        }
        account.balance = Some(balance);
        self.persist_account(&account);
        debug!(balance = %balance, "[lc-04] balance updated");
    }

    fn apply_sync_state(&self, generation: u64, state: SyncState) {
        let mut reporter = self.sync_state.lock();
        if !self.generation.is_current(generation) {
            trace!(generation, "[lc-04] stale sync state dropped");
            return;
        }
        self.report(&mut reporter, state);
    }

    fn set_sync_state(&self, state: SyncState) {
        let mut reporter = self.sync_state.lock();
        self.report(&mut reporter, state);
    }

    fn report(&self, reporter: &mut SyncStateReporter, state: SyncState) {
        if reporter.observe(state.clone()) {
            info!(state = %state, "[lc-04] sync state changed");
            self.sync_states.publish(state);
        }
    }

    fn spawn_receipt_check(self: &Arc<Self>, generation: u64) {
        if self.transactions.lock().pending_hashes().is_empty() {
            return;
        }
        let core = Arc::clone(self);
        tokio::spawn(async move { core.check_receipts(generation).await });
    }

    /// Look up receipts of pending transactions and mark the included ones.
    async fn check_receipts(&self, generation: u64) {
        let Some(_flight) = self.receipts.try_begin() else {
            trace!("[lc-04] receipt check already running");
            return;
        };

        let pending = self.transactions.lock().pending_hashes();
        let mut included = Vec::new();
        for hash in pending {
            match self.syncer.fetch_receipt(hash).await {
                Ok(Some(receipt)) => included.push(receipt),
                Ok(None) => {}
                Err(err) => {
                    debug!(error = %err, "[lc-04] receipt check interrupted");
                    break;
                }
            }
        }
        if included.is_empty() {
            return;
        }

        let mut transactions = self.transactions.lock();
        if !self.generation.is_current(generation) {
            trace!(generation, "[lc-04] stale receipts dropped");
            return;
        }
        let mut changed = 0usize;
        for receipt in included {
            let status = if receipt.success {
                TransactionStatus::Confirmed {
                    block_number: receipt.block_number,
                }
            } else {
                TransactionStatus::Failed {
                    block_number: receipt.block_number,
                }
            };
            if transactions.set_status(&receipt.transaction_hash, status) {
                changed += 1;
            }
        }
        if changed > 0 {
            info!(count = changed, "[lc-04] transactions included");
            self.persist_transactions(&transactions);
            self.transaction_lists
                .publish(transactions.records().to_vec());
        }
    }

    fn persist_account(&self, account: &AccountState) {
        if let Err(err) = self
            .storage
            .store_account(&self.address, self.network, account)
        {
            warn!(error = %err, "[lc-04] failed to persist account state");
        }
    }

    fn persist_transactions(&self, transactions: &TransactionSet) {
        if let Err(err) =
            self.storage
                .store_transactions(&self.address, self.network, transactions.records())
        {
            warn!(error = %err, "[lc-04] failed to persist transactions");
        }
    }
}

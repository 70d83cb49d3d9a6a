//! # Polling Provider
//!
//! Discrete remote calls on an interval. A failed poll lengthens the wait
//! through `Backoff`; a successful one resets it. While the network is
//! reported unreachable the loop parks, and it polls at once when
//! reachability returns. A reachability flip that lands while a poll is in
//! flight leaves the schedule alone.

use super::session::Session;
use crate::algorithms::Backoff;
use crate::config::SyncerConfig;
use crate::domain::{CallRequest, Log, LogFilter, SyncerError, TransactionReceipt};
use crate::ports::{EventSink, RpcClient, Syncer};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, Hash, NotSyncedReason, SyncState, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct PollingShared {
    client: Arc<dyn RpcClient>,
    config: SyncerConfig,
    session: Session,
    reachable: AtomicBool,
    wake: Notify,
}

impl PollingShared {
    /// One poll. Reports the outcome unless the network went away meanwhile.
    async fn poll_once(&self, generation: u64) -> Result<(), SyncerError> {
        let result = self.session.refresh(self.client.as_ref(), generation).await;
        if !self.reachable.load(Ordering::Acquire) {
            return result.map(|_| ());
        }
        match &result {
            Ok(_) => self.session.report(generation, SyncState::Synced),
            Err(SyncerError::Cancelled) => {}
            Err(err) => self
                .session
                .report(generation, SyncState::NotSynced(err.not_synced_reason())),
        }
        result.map(|_| ())
    }
}

async fn run(shared: Arc<PollingShared>, generation: u64) {
    let mut backoff = Backoff::new(shared.config.backoff_base(), shared.config.backoff_max());
    loop {
        if !shared.session.is_current(generation) {
            return;
        }
        if !shared.reachable.load(Ordering::Acquire) {
            let parked = shared.wake.notified();
            tokio::pin!(parked);
            // Registered before the re-check so a wake in between is kept
            parked.as_mut().enable();
            if !shared.reachable.load(Ordering::Acquire) {
                debug!("[lc-03] polling suspended until reachable");
                parked.await;
            }
            continue;
        }

        let delay = match shared.poll_once(generation).await {
            Ok(()) => {
                backoff.reset();
                shared.config.poll_interval()
            }
            Err(SyncerError::Cancelled) => return,
            Err(err) => {
                let delay = backoff.next_delay();
                warn!(
                    error = %err,
                    failures = backoff.failures(),
                    retry_ms = delay.as_millis() as u64,
                    "[lc-03] poll failed"
                );
                delay
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shared.wake.notified() => debug!("[lc-03] poll woken early"),
        }
    }
}

/// Interval-driven provider over a remote-procedure collaborator.
pub struct PollingSyncer {
    shared: Arc<PollingShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingSyncer {
    /// Create a provider calling through `client`.
    pub fn new(client: Arc<dyn RpcClient>, config: SyncerConfig) -> Self {
        let session = Session::new(config.request_timeout());
        Self {
            shared: Arc::new(PollingShared {
                client,
                config,
                session,
                reachable: AtomicBool::new(true),
                wake: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Last reachability signal.
    pub fn is_reachable(&self) -> bool {
        self.shared.reachable.load(Ordering::Acquire)
    }

    fn abort_task(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for PollingSyncer {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[async_trait]
impl Syncer for PollingSyncer {
    async fn start(&self, address: Address, sink: EventSink) -> Result<(), SyncerError> {
        self.abort_task();
        let generation = self.shared.session.begin(address, sink);
        info!(?address, generation, "[lc-03] polling syncer started");
        if self.is_reachable() {
            self.shared.session.report(generation, SyncState::Syncing(None));
        } else {
            self.shared
                .session
                .report(generation, SyncState::NotSynced(NotSyncedReason::NoConnection));
        }
        let handle = tokio::spawn(run(self.shared.clone(), generation));
        *self.task.lock() = Some(handle);
        Ok(())
    }

    async fn stop(&self) {
        self.shared.session.end();
        self.abort_task();
        info!("[lc-03] polling syncer stopped");
    }

    async fn refresh(&self) -> Result<(), SyncerError> {
        if !self.shared.session.is_active() {
            return Err(SyncerError::NotStarted);
        }
        let generation = self.shared.session.generation();
        self.shared.poll_once(generation).await
    }

    async fn fetch_balance(&self, address: Address) -> Result<U256, SyncerError> {
        self.shared
            .session
            .fetch_balance(self.shared.client.as_ref(), address)
            .await
    }

    async fn fetch_height(&self) -> Result<u64, SyncerError> {
        self.shared
            .session
            .fetch_height(self.shared.client.as_ref())
            .await
    }

    async fn fetch_nonce(&self, address: Address) -> Result<u64, SyncerError> {
        self.shared
            .session
            .fetch_nonce(self.shared.client.as_ref(), address)
            .await
    }

    async fn fetch_logs(&self, filter: LogFilter) -> Result<Vec<Log>, SyncerError> {
        self.shared
            .session
            .fetch_logs(self.shared.client.as_ref(), filter)
            .await
    }

    async fn fetch_receipt(&self, hash: Hash) -> Result<Option<TransactionReceipt>, SyncerError> {
        self.shared
            .session
            .fetch_receipt(self.shared.client.as_ref(), hash)
            .await
    }

    async fn submit(&self, signed: Vec<u8>) -> Result<Hash, SyncerError> {
        self.shared
            .session
            .submit(self.shared.client.as_ref(), signed)
            .await
    }

    async fn estimate_gas(&self, call: CallRequest) -> Result<u64, SyncerError> {
        self.shared
            .session
            .estimate_gas(self.shared.client.as_ref(), call)
            .await
    }

    fn sync_state(&self) -> SyncState {
        self.shared.session.sync_state()
    }

    fn set_reachable(&self, reachable: bool) {
        let was = self.shared.reachable.swap(reachable, Ordering::AcqRel);
        if was == reachable {
            return;
        }
        let session = &self.shared.session;
        if reachable {
            info!("[lc-03] network reachable, polling resumed");
            if session.is_active() {
                session.report(session.generation(), SyncState::Syncing(None));
            }
            // Wakes a parked or sleeping loop only; stores no permit
            self.shared.wake.notify_waiters();
        } else {
            info!("[lc-03] network unreachable, polling suspended");
            if session.is_active() {
                session.report(
                    session.generation(),
                    SyncState::NotSynced(NotSyncedReason::NoConnection),
                );
            }
        }
    }
}

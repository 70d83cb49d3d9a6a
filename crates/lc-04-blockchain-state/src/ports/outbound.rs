//! # Outbound Ports (Driven Side)
//!
//! Persistence collaborator for the last known account state and the
//! transaction history, keyed by tracked address and network.

use crate::domain::StateError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{AccountState, Address, NetworkId, TransactionRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Everything persisted for one `(address, network)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAccount {
    /// Last known height and balance.
    pub account: AccountState,
    /// Transaction history in any order.
    pub transactions: Vec<TransactionRecord>,
}

/// Synchronous key-value persistence.
///
/// Writes are small and infrequent; implementations may block briefly.
pub trait StateStorage: Send + Sync {
    /// Load the stored record, or an empty one if nothing was stored.
    fn load(&self, address: &Address, network: NetworkId) -> Result<StoredAccount, StateError>;

    /// Replace the stored account state.
    fn store_account(
        &self,
        address: &Address,
        network: NetworkId,
        account: &AccountState,
    ) -> Result<(), StateError>;

    /// Replace the stored transaction history.
    fn store_transactions(
        &self,
        address: &Address,
        network: NetworkId,
        transactions: &[TransactionRecord],
    ) -> Result<(), StateError>;
}

/// In-memory storage for tests and ephemeral wallets.
#[derive(Default)]
pub struct InMemoryStateStorage {
    records: Mutex<HashMap<(Address, NetworkId), StoredAccount>>,
    writes: AtomicU64,
    fail_writes: AtomicBool,
}

impl InMemoryStateStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record.
    pub fn insert(&self, address: Address, network: NetworkId, stored: StoredAccount) {
        self.records.lock().insert((address, network), stored);
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Successful writes so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(
        &self,
        address: &Address,
        network: NetworkId,
        update: impl FnOnce(&mut StoredAccount),
    ) -> Result<(), StateError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StateError::Storage("write rejected".into()));
        }
        let mut records = self.records.lock();
        update(records.entry((*address, network)).or_default());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl StateStorage for InMemoryStateStorage {
    fn load(&self, address: &Address, network: NetworkId) -> Result<StoredAccount, StateError> {
        Ok(self
            .records
            .lock()
            .get(&(*address, network))
            .cloned()
            .unwrap_or_default())
    }

    fn store_account(
        &self,
        address: &Address,
        network: NetworkId,
        account: &AccountState,
    ) -> Result<(), StateError> {
        self.write(address, network, |stored| stored.account = account.clone())
    }

    fn store_transactions(
        &self,
        address: &Address,
        network: NetworkId,
        transactions: &[TransactionRecord],
    ) -> Result<(), StateError> {
        self.write(address, network, |stored| {
            stored.transactions = transactions.to_vec()
        })
    }
}

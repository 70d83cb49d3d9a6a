//! # Transaction Set
//!
//! The tracked account's transaction history, newest first. Order is by
//! local timestamp, then nonce; a hash appears at most once.

use shared_types::{Hash, TransactionRecord, TransactionStatus};

/// Ordered, hash-unique transaction history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionSet {
    records: Vec<TransactionRecord>,
}

fn newer_first(a: &TransactionRecord, b: &TransactionRecord) -> std::cmp::Ordering {
    (b.timestamp, b.nonce).cmp(&(a.timestamp, a.nonce))
}

impl TransactionSet {
    /// Build from persisted records in any order. Later duplicates win.
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        let mut set = Self::default();
        for record in records {
            set.insert(record);
        }
        set
    }

    /// Insert or replace by hash. Returns `false` if an identical record
    /// was already present.
    pub fn insert(&mut self, record: TransactionRecord) -> bool {
        if let Some(pos) = self.records.iter().position(|r| r.hash == record.hash) {
            if self.records[pos] == record {
                return false;
            }
            self.records.remove(pos);
        }
        let at = self
            .records
            .partition_point(|r| newer_first(r, &record) != std::cmp::Ordering::Greater);
        self.records.insert(at, record);
        true
    }

    /// Record with `hash`.
    pub fn get(&self, hash: &Hash) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| &r.hash == hash)
    }

    /// Hashes still waiting for a receipt, oldest first.
    pub fn pending_hashes(&self) -> Vec<Hash> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.status.is_pending())
            .map(|r| r.hash)
            .collect()
    }

    /// Set the status of `hash`. Returns `true` if it changed.
    pub fn set_status(&mut self, hash: &Hash, status: TransactionStatus) -> bool {
        match self.records.iter_mut().find(|r| &r.hash == hash) {
            Some(record) if record.status != status => {
                record.status = status;
                true
            }
            _ => false,
        }
    }

    /// Up to `limit` records older than `from_hash` (exclusive), or from the
    /// newest when `from_hash` is `None`. An unknown `from_hash` yields
    /// nothing.
    pub fn page(&self, from_hash: Option<&Hash>, limit: usize) -> Vec<TransactionRecord> {
        let start = match from_hash {
            None => 0,
            Some(hash) => match self.records.iter().position(|r| &r.hash == hash) {
                Some(pos) => pos + 1,
                None => return Vec::new(),
            },
        };
        self.records.iter().skip(start).take(limit).cloned().collect()
    }

    /// All records, newest first.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

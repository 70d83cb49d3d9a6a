//! # Outbound Ports (Driven Side)
//!
//! Where sent transactions are recorded. The network side is the
//! `Syncer` port from `lc-03-syncer`.

use parking_lot::Mutex;
use shared_types::TransactionRecord;

/// Receives every transaction the pipeline broadcasts.
pub trait TransactionRegistry: Send + Sync {
    /// Record a freshly broadcast, still pending transaction.
    fn register(&self, record: TransactionRecord);
}

/// Registry that keeps records in memory, for tests.
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    records: Mutex<Vec<TransactionRecord>>,
}

impl RecordingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything registered, in order.
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records.lock().clone()
    }
}

impl TransactionRegistry for RecordingRegistry {
    fn register(&self, record: TransactionRecord) {
        self.records.lock().push(record);
    }
}

//! Routes transactions sent by the pipeline into the state machine's
//! history, which fires the transactions stream.

use lc_04_blockchain_state::BlockchainStateMachine;
use lc_05_transactions::TransactionRegistry;
use shared_types::TransactionRecord;
use std::sync::Arc;

/// `TransactionRegistry` backed by the state machine.
pub struct StateRegistry {
    state: Arc<BlockchainStateMachine>,
}

impl StateRegistry {
    /// Wrap `state`.
    pub fn new(state: Arc<BlockchainStateMachine>) -> Self {
        Self { state }
    }
}

impl TransactionRegistry for StateRegistry {
    fn register(&self, record: TransactionRecord) {
        self.state.register_transaction(record);
    }
}

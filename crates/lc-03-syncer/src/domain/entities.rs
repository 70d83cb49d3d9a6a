//! # Domain Entities
//!
//! Records exchanged with providers and the event stream a started syncer
//! delivers to its owner.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, SyncState, U256};

/// Log query.
///
/// `topics[i] == None` matches any value in position `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// First block, inclusive. `None` means the latest block.
    pub from_block: Option<u64>,
    /// Last block, inclusive. `None` means the latest block.
    pub to_block: Option<u64>,
    /// Emitting contract.
    pub address: Option<Address>,
    /// Positional topic constraints.
    pub topics: Vec<Option<Hash>>,
}

impl LogFilter {
    /// Filter over a closed block range.
    pub fn range(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block: Some(from_block),
            to_block: Some(to_block),
            ..Default::default()
        }
    }

    /// Restrict to logs emitted by `address`.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Require `topic` at `position`.
    pub fn with_topic(mut self, position: usize, topic: Hash) -> Self {
        if self.topics.len() <= position {
            self.topics.resize(position + 1, None);
        }
        self.topics[position] = Some(topic);
        self
    }

    /// True if `log` satisfies this filter, block range included.
    pub fn matches(&self, log: &Log) -> bool {
        if let Some(address) = self.address {
            if log.address != address {
                return false;
            }
        }
        if let Some(block) = log.block_number {
            if self.from_block.is_some_and(|from| block < from)
                || self.to_block.is_some_and(|to| block > to)
            {
                return false;
            }
        }
        self.topics.iter().enumerate().all(|(i, wanted)| match wanted {
            None => true,
            Some(topic) => log.topics.get(i) == Some(topic),
        })
    }
}

/// An event log emitted during execution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics.
    pub topics: Vec<Hash>,
    /// Unindexed payload.
    pub data: Vec<u8>,
    /// Including block, absent while pending.
    pub block_number: Option<u64>,
    /// Emitting transaction.
    pub transaction_hash: Option<Hash>,
    /// Position within the block.
    pub log_index: Option<u64>,
}

/// Outcome of an included transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Transaction this receipt belongs to.
    pub transaction_hash: Hash,
    /// Including block.
    pub block_number: u64,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Execution succeeded.
    pub success: bool,
    /// Logs emitted.
    pub logs: Vec<Log>,
}

/// Message call used for gas estimation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Caller.
    pub from: Option<Address>,
    /// Callee; `None` for contract creation.
    pub to: Option<Address>,
    /// Attached value.
    pub value: U256,
    /// Offered gas price.
    pub gas_price: Option<U256>,
    /// Call data.
    pub data: Vec<u8>,
}

/// Update delivered by a started syncer, in detection order.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncerEvent {
    /// Chain head height.
    Height(u64),
    /// Balance of the tracked account.
    Balance(U256),
    /// Link health changed.
    SyncState(SyncState),
}

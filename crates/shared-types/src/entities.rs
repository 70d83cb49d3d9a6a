//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Primitives**: `Address`, `Hash`, `U256`, `keccak256`
//! - **Account**: `AccountState`, `NetworkId`
//! - **Transactions**: `TransactionRecord`, `TransactionStatus`

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

// Re-export primitive types for use across all subsystems
pub use primitive_types::{H160 as Address, H256 as Hash, U256};

/// Compute the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    Hash::from_slice(&hasher.finalize())
}

// =============================================================================
// ACCOUNT
// =============================================================================

/// Chain identifier the client is attached to.
///
/// Doubles as the EIP-155 replay-protection chain id and as part of the
/// persistence key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId(pub u64);

impl NetworkId {
    /// Ethereum mainnet.
    pub const MAINNET: NetworkId = NetworkId(1);
    /// Sepolia test network.
    pub const SEPOLIA: NetworkId = NetworkId(11_155_111);
    /// Local development chains.
    pub const DEV: NetworkId = NetworkId(1337);

    /// Numeric chain id.
    pub fn chain_id(&self) -> u64 {
        self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::MAINNET
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chain-{}", self.0)
    }
}

/// Last known view of the tracked account.
///
/// Both fields are absent until the active syncer reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Height of the most recent block seen.
    pub last_block_height: Option<u64>,
    /// Account balance in the smallest unit.
    pub balance: Option<U256>,
}

impl AccountState {
    /// Reset both fields to absent.
    pub fn clear(&mut self) {
        self.last_block_height = None;
        self.balance = None;
    }

    /// True when neither height nor balance is known.
    pub fn is_empty(&self) -> bool {
        self.last_block_height.is_none() && self.balance.is_none()
    }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// Inclusion status of a transaction sent or observed by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Broadcast, no receipt yet.
    Pending,
    /// Included in a block and executed successfully.
    Confirmed {
        /// Block that included the transaction.
        block_number: u64,
    },
    /// Included in a block but execution reverted.
    Failed {
        /// Block that included the transaction.
        block_number: u64,
    },
}

impl TransactionStatus {
    /// Block number for included transactions.
    pub fn block_number(&self) -> Option<u64> {
        match self {
            TransactionStatus::Pending => None,
            TransactionStatus::Confirmed { block_number }
            | TransactionStatus::Failed { block_number } => Some(*block_number),
        }
    }

    /// True until a receipt has been observed.
    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionStatus::Pending)
    }
}

/// A transaction in the tracked account's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Keccak hash of the signed, encoded transaction.
    pub hash: Hash,
    /// Sender nonce.
    pub nonce: u64,
    /// Sender address.
    pub from: Address,
    /// Recipient (absent for contract creation).
    pub to: Option<Address>,
    /// Transferred amount.
    pub value: U256,
    /// Gas price offered.
    pub gas_price: U256,
    /// Gas limit offered.
    pub gas_limit: u64,
    /// Call data.
    pub input: Vec<u8>,
    /// Unix timestamp (seconds) when the record was created locally.
    pub timestamp: u64,
    /// Inclusion status.
    pub status: TransactionStatus,
}

impl TransactionRecord {
    /// True once the transaction has a receipt.
    pub fn is_included(&self) -> bool {
        !self.status.is_pending()
    }
}

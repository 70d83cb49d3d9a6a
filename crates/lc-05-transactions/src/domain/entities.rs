//! # Transaction Entities
//!
//! Immutable records that flow through the pipeline:
//! `SendRequest` → `RawTransaction` → `Signature` → `SentTransaction`.

use super::errors::SigningError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, TransactionRecord, TransactionStatus, U256};

/// Largest chain id whose EIP-155 `v` fits in a `u64` for either parity.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Caller input for a send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    /// Amount to transfer.
    pub value: U256,
    /// Call data.
    pub data: Vec<u8>,
    /// Offered gas price.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Explicit nonce; fetched from the network when absent.
    pub nonce: Option<u64>,
}

impl SendRequest {
    /// Plain value transfer with the given gas parameters.
    pub fn transfer(to: Address, value: U256, gas_price: U256, gas_limit: u64) -> Self {
        Self {
            to: Some(to),
            value,
            data: Vec::new(),
            gas_price,
            gas_limit,
            nonce: None,
        }
    }

    /// Set call data.
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Pin the nonce.
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }
}

/// Unsigned legacy transaction. Built once, consumed once by signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    /// Sender nonce.
    pub nonce: u64,
    /// Gas price.
    pub gas_price: U256,
    /// Gas limit.
    pub gas_limit: u64,
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    /// Amount transferred.
    pub value: U256,
    /// Call data.
    pub data: Vec<u8>,
}

/// secp256k1 signature with its recovery id (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// R component.
    pub r: U256,
    /// S component, low-S normalised.
    pub s: U256,
    /// Parity of the ephemeral public key's y coordinate.
    pub recovery_id: u8,
}

impl Signature {
    /// EIP-155 `v` for `chain_id`. Fails above [`MAX_CHAIN_ID`].
    pub fn v(&self, chain_id: u64) -> Result<u64, SigningError> {
        chain_id
            .checked_mul(2)
            .and_then(|doubled| doubled.checked_add(35 + u64::from(self.recovery_id)))
            .ok_or_else(|| SigningError::Malformed(format!("chain id {chain_id} out of range")))
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTransaction {
    /// Network hash, keccak of `encoded`.
    pub hash: Hash,
    /// What was signed.
    pub raw: RawTransaction,
    /// Signature over `raw`.
    pub signature: Signature,
    /// Broadcast payload.
    pub encoded: Vec<u8>,
}

impl SentTransaction {
    /// History record for the sender, pending inclusion.
    pub fn to_record(&self, from: Address, timestamp: u64) -> TransactionRecord {
        TransactionRecord {
            hash: self.hash,
            nonce: self.raw.nonce,
            from,
            to: self.raw.to,
            value: self.raw.value,
            gas_price: self.raw.gas_price,
            gas_limit: self.raw.gas_limit,
            input: self.raw.data.clone(),
            timestamp,
            status: TransactionStatus::Pending,
        }
    }
}

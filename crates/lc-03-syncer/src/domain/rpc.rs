//! # Remote Procedure Values
//!
//! Typed requests handed to the remote-procedure collaborator and the
//! already-deserialized values it hands back. No wire-format logic lives
//! here; the collaborator owns that.

use super::entities::{CallRequest, Log, LogFilter, TransactionReceipt};
use super::errors::SyncerError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, U256};

/// A remote procedure call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcRequest {
    /// Current head height.
    BlockNumber,
    /// Balance at the latest block.
    GetBalance(Address),
    /// Next nonce, pending transactions included.
    GetTransactionCount(Address),
    /// Logs matching a filter.
    GetLogs(LogFilter),
    /// Receipt of an included transaction.
    GetTransactionReceipt(Hash),
    /// Broadcast a signed, encoded transaction.
    SendRawTransaction(Vec<u8>),
    /// Gas needed by a call.
    EstimateGas(CallRequest),
}

impl RpcRequest {
    /// Method name on the provider.
    pub fn method(&self) -> &'static str {
        match self {
            RpcRequest::BlockNumber => "eth_blockNumber",
            RpcRequest::GetBalance(_) => "eth_getBalance",
            RpcRequest::GetTransactionCount(_) => "eth_getTransactionCount",
            RpcRequest::GetLogs(_) => "eth_getLogs",
            RpcRequest::GetTransactionReceipt(_) => "eth_getTransactionReceipt",
            RpcRequest::SendRawTransaction(_) => "eth_sendRawTransaction",
            RpcRequest::EstimateGas(_) => "eth_estimateGas",
        }
    }
}

/// A deserialized result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcValue {
    /// A number.
    Quantity(U256),
    /// A 32-byte hash.
    Hash(Hash),
    /// A list of logs.
    Logs(Vec<Log>),
    /// A receipt, or `None` while the transaction is pending.
    Receipt(Option<TransactionReceipt>),
}

impl RpcValue {
    fn shape(&self) -> &'static str {
        match self {
            RpcValue::Quantity(_) => "quantity",
            RpcValue::Hash(_) => "hash",
            RpcValue::Logs(_) => "logs",
            RpcValue::Receipt(_) => "receipt",
        }
    }

    fn unexpected(&self, wanted: &str) -> SyncerError {
        SyncerError::Decode(format!("expected {}, got {}", wanted, self.shape()))
    }

    /// Interpret as an arbitrary-precision quantity.
    pub fn into_u256(self) -> Result<U256, SyncerError> {
        match self {
            RpcValue::Quantity(q) => Ok(q),
            other => Err(other.unexpected("quantity")),
        }
    }

    /// Interpret as a quantity that must fit in `u64`.
    pub fn into_u64(self) -> Result<u64, SyncerError> {
        let q = self.into_u256()?;
        if q > U256::from(u64::MAX) {
            return Err(SyncerError::Decode(format!("quantity {} overflows u64", q)));
        }
        Ok(q.as_u64())
    }

    /// Interpret as a hash.
    pub fn into_hash(self) -> Result<Hash, SyncerError> {
        match self {
            RpcValue::Hash(h) => Ok(h),
            other => Err(other.unexpected("hash")),
        }
    }

    /// Interpret as a log list.
    pub fn into_logs(self) -> Result<Vec<Log>, SyncerError> {
        match self {
            RpcValue::Logs(logs) => Ok(logs),
            other => Err(other.unexpected("logs")),
        }
    }

    /// Interpret as an optional receipt.
    pub fn into_receipt(self) -> Result<Option<TransactionReceipt>, SyncerError> {
        match self {
            RpcValue::Receipt(r) => Ok(r),
            other => Err(other.unexpected("receipt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(RpcRequest::BlockNumber.method(), "eth_blockNumber");
        assert_eq!(
            RpcRequest::SendRawTransaction(vec![]).method(),
            "eth_sendRawTransaction"
        );
    }

    #[test]
    fn test_into_u64_overflow() {
        let value = RpcValue::Quantity(U256::from(u64::MAX) + 1);
        assert!(matches!(value.into_u64(), Err(SyncerError::Decode(_))));
    }

    #[test]
    fn test_wrong_shape_is_decode_error() {
        let err = RpcValue::Hash(Hash::zero()).into_u256().unwrap_err();
        assert_eq!(
            err,
            SyncerError::Decode("expected quantity, got hash".to_string())
        );
    }
}

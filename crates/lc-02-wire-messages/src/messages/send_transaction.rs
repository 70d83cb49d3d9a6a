//! `SendTransaction` (0x13): relay signed transactions to a provider.
//!
//! Layout: `[requestId, [signedTx, ...]]`. Each transaction is carried as
//! its own decoded list so the body re-encodes byte-for-byte.

use crate::domain::{Fields, MessageError};
use lc_01_rlp_codec::{decode_exact, RlpNode};

/// Signed transaction relay request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendTransactionMessage {
    /// Correlation token.
    pub request_id: u64,
    /// Signed transactions as list nodes.
    pub transactions: Vec<RlpNode>,
}

impl SendTransactionMessage {
    /// Wrap already-encoded signed transactions.
    pub fn from_encoded(request_id: u64, encoded: &[Vec<u8>]) -> Result<Self, MessageError> {
        let transactions = encoded
            .iter()
            .map(|raw| decode_exact(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            request_id,
            transactions,
        })
    }

    /// Decode from the body list.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "SendTransaction", strict_integers)?;
        let request_id = f.u64(0, "requestId")?;
        let transactions = f.list(1, "transactions")?;
        for tx in transactions {
            Fields::new(tx, "transaction", strict_integers)?;
        }
        Ok(Self {
            request_id,
            transactions: transactions.to_vec(),
        })
    }

    /// Encode into the body list.
    pub fn to_node(&self) -> RlpNode {
        RlpNode::list(vec![
            RlpNode::from_u64(self.request_id),
            RlpNode::list(self.transactions.clone()),
        ])
    }
}

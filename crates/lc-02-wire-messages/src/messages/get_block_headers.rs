//! `GetBlockHeaders` (0x02): request a run of headers.
//!
//! Layout: `[requestId, [origin, amount, skip, reverse]]` where `origin` is
//! either a block number or a 32-byte block hash.

use crate::domain::{Fields, MessageError};
use lc_01_rlp_codec::RlpNode;
use shared_types::Hash;

/// Starting block of a header request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockRef {
    /// By height.
    Number(u64),
    /// By hash.
    Hash(Hash),
}

/// Header range request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetBlockHeadersMessage {
    /// Correlation token echoed in the response.
    pub request_id: u64,
    /// First block of the run.
    pub origin: BlockRef,
    /// Maximum headers to return.
    pub amount: u64,
    /// Blocks to skip between consecutive headers.
    pub skip: u64,
    /// Walk towards genesis instead of towards the tip.
    pub reverse: bool,
}

impl GetBlockHeadersMessage {
    /// Request `amount` consecutive headers starting at block `from`.
    pub fn by_number(request_id: u64, from: u64, amount: u64) -> Self {
        Self {
            request_id,
            origin: BlockRef::Number(from),
            amount,
            skip: 0,
            reverse: false,
        }
    }

    /// Decode from the body list.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "GetBlockHeaders", strict_integers)?;
        let request_id = f.u64(0, "requestId")?;
        let query_node = f.node(1, "query")?;
        let q = Fields::new(query_node, "query", strict_integers)?;

        let origin_bytes = q.bytes(0, "origin")?;
        let origin = if origin_bytes.len() == 32 {
            BlockRef::Hash(Hash::from_slice(origin_bytes))
        } else {
            BlockRef::Number(q.u64(0, "origin")?)
        };

        Ok(Self {
            request_id,
            origin,
            amount: q.u64(1, "amount")?,
            skip: q.u64(2, "skip")?,
            reverse: q.u64(3, "reverse")? != 0,
        })
    }

    /// Encode into the body list.
    pub fn to_node(&self) -> RlpNode {
        let origin = match &self.origin {
            BlockRef::Number(n) => RlpNode::from_u64(*n),
            BlockRef::Hash(h) => RlpNode::from_hash(h),
        };
        RlpNode::list(vec![
            RlpNode::from_u64(self.request_id),
            RlpNode::list(vec![
                origin,
                RlpNode::from_u64(self.amount),
                RlpNode::from_u64(self.skip),
                RlpNode::from_u64(self.reverse as u64),
            ]),
        ])
    }
}

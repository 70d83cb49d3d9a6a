//! `BlockHeaders` (0x03): response to `GetBlockHeaders`.
//!
//! Layout: `[requestId, bufferValue, [header, ...]]`.

use crate::domain::{BlockHeader, Fields, MessageError};
use lc_01_rlp_codec::RlpNode;

/// Headers returned by a provider, in wire order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeadersMessage {
    /// Correlation token echoed from the request.
    pub request_id: u64,
    /// Provider-side rate-limit credit remaining.
    pub buffer_value: u64,
    /// Headers, in the order the provider sent them.
    pub headers: Vec<BlockHeader>,
}

impl BlockHeadersMessage {
    /// Decode from the body list.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "BlockHeaders", strict_integers)?;
        let request_id = f.u64(0, "requestId")?;
        let buffer_value = f.u64(1, "bufferValue")?;
        let headers = f
            .list(2, "headers")?
            .iter()
            .map(|h| BlockHeader::from_node(h, strict_integers))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            request_id,
            buffer_value,
            headers,
        })
    }

    /// Encode into the body list.
    pub fn to_node(&self) -> RlpNode {
        RlpNode::list(vec![
            RlpNode::from_u64(self.request_id),
            RlpNode::from_u64(self.buffer_value),
            RlpNode::list(self.headers.iter().map(BlockHeader::to_node).collect()),
        ])
    }

    /// Highest block number among the returned headers.
    pub fn highest_number(&self) -> Option<u64> {
        self.headers.iter().map(|h| h.number).max()
    }
}

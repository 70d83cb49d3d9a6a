//! `Announce` (0x01): a provider's new head.
//!
//! Layout: `[headHash, headNumber, headTd, reorgDepth, [key, value]...]`.
//! Trailing key/value pairs carry capability updates and are kept as-is.

use crate::domain::{Fields, MessageError};
use lc_01_rlp_codec::RlpNode;
use shared_types::{Hash, U256};

/// New-head announcement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnounceMessage {
    /// Hash of the announced head.
    pub head_hash: Hash,
    /// Number of the announced head.
    pub head_number: u64,
    /// Total difficulty at the head.
    pub head_td: U256,
    /// Blocks rolled back before this head.
    pub reorg_depth: u64,
    /// Trailing capability updates.
    pub updates: Vec<RlpNode>,
}

impl AnnounceMessage {
    /// Decode from the body list.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "Announce", strict_integers)?;
        Ok(Self {
            head_hash: f.hash(0, "headHash")?,
            head_number: f.u64(1, "headNumber")?,
            head_td: f.u256(2, "headTd")?,
            reorg_depth: f.u64(3, "reorgDepth")?,
            updates: f.rest(4).to_vec(),
        })
    }

    /// Encode into the body list.
    pub fn to_node(&self) -> RlpNode {
        let mut items = vec![
            RlpNode::from_hash(&self.head_hash),
            RlpNode::from_u64(self.head_number),
            RlpNode::from_u256(self.head_td),
            RlpNode::from_u64(self.reorg_depth),
        ];
        items.extend(self.updates.iter().cloned());
        RlpNode::list(items)
    }
}

//! `Status` (0x00): handshake exchanged on connect.
//!
//! Layout: a list of `[key, value]` pairs. The six keys below are required;
//! anything else is kept in `extra` in arrival order.

use crate::domain::{Fields, MessageError};
use lc_01_rlp_codec::RlpNode;
use shared_types::{Hash, U256};

const PROTOCOL_VERSION: &str = "protocolVersion";
const NETWORK_ID: &str = "networkId";
const HEAD_TD: &str = "headTd";
const HEAD_HASH: &str = "headHash";
const HEAD_NUM: &str = "headNum";
const GENESIS_HASH: &str = "genesisHash";

/// Peer handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    /// Light protocol version.
    pub protocol_version: u64,
    /// Network the peer is on.
    pub network_id: u64,
    /// Total difficulty of the peer's head.
    pub head_td: U256,
    /// Hash of the peer's head.
    pub head_hash: Hash,
    /// Number of the peer's head.
    pub head_number: u64,
    /// Genesis hash.
    pub genesis_hash: Hash,
    /// Other announced keys, verbatim.
    pub extra: Vec<(String, RlpNode)>,
}

impl StatusMessage {
    /// Decode from the body list.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "Status", strict_integers)?;

        let mut protocol_version = None;
        let mut network_id = None;
        let mut head_td = None;
        let mut head_hash = None;
        let mut head_number = None;
        let mut genesis_hash = None;
        let mut extra = Vec::new();

        for index in 0..f.len() {
            let pair = Fields::new(f.node(index, "statusPair")?, "statusPair", strict_integers)?;
            let key = String::from_utf8_lossy(pair.bytes(0, "statusKey")?).into_owned();
            match key.as_str() {
                PROTOCOL_VERSION => protocol_version = Some(pair.u64(1, PROTOCOL_VERSION)?),
                NETWORK_ID => network_id = Some(pair.u64(1, NETWORK_ID)?),
                HEAD_TD => head_td = Some(pair.u256(1, HEAD_TD)?),
                HEAD_HASH => head_hash = Some(pair.hash(1, HEAD_HASH)?),
                HEAD_NUM => head_number = Some(pair.u64(1, HEAD_NUM)?),
                GENESIS_HASH => genesis_hash = Some(pair.hash(1, GENESIS_HASH)?),
                _ => {
                    // Flag keys may come without a value
                    let value = pair.rest(1).first().cloned().unwrap_or_else(RlpNode::empty);
                    extra.push((key, value));
                }
            }
        }

        Ok(Self {
            protocol_version: required(protocol_version, PROTOCOL_VERSION)?,
            network_id: required(network_id, NETWORK_ID)?,
            head_td: required(head_td, HEAD_TD)?,
            head_hash: required(head_hash, HEAD_HASH)?,
            head_number: required(head_number, HEAD_NUM)?,
            genesis_hash: required(genesis_hash, GENESIS_HASH)?,
            extra,
        })
    }

    /// Encode into the body list.
    pub fn to_node(&self) -> RlpNode {
        let pair = |key: &str, value: RlpNode| {
            RlpNode::list(vec![RlpNode::bytes(key.as_bytes().to_vec()), value])
        };
        let mut items = vec![
            pair(PROTOCOL_VERSION, RlpNode::from_u64(self.protocol_version)),
            pair(NETWORK_ID, RlpNode::from_u64(self.network_id)),
            pair(HEAD_TD, RlpNode::from_u256(self.head_td)),
            pair(HEAD_HASH, RlpNode::from_hash(&self.head_hash)),
            pair(HEAD_NUM, RlpNode::from_u64(self.head_number)),
            pair(GENESIS_HASH, RlpNode::from_hash(&self.genesis_hash)),
        ];
        items.extend(self.extra.iter().map(|(k, v)| pair(k, v.clone())));
        RlpNode::list(items)
    }
}

// Keyed fields have no position; index 0 marks "anywhere in the list".
fn required<T>(value: Option<T>, field: &'static str) -> Result<T, MessageError> {
    value.ok_or(MessageError::MissingField { field, index: 0 })
}

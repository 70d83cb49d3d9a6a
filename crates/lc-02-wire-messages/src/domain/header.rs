//! # Block Header
//!
//! Header record as carried in `BlockHeaders` responses. Field order follows
//! the network's header schema; fields appended by later forks are kept
//! verbatim in `extra_fields`. A decoded header also keeps the node it was
//! read from, and hashes that, so leniently read integers do not change
//! the hash.

use super::errors::MessageError;
use super::fields::Fields;
use lc_01_rlp_codec::{encode, RlpNode};
use shared_types::{keccak256, Address, Hash, U256};

/// Size of the logs bloom filter in bytes.
pub const LOGS_BLOOM_LEN: usize = 256;

/// Number of fields every header must carry.
const REQUIRED_FIELDS: usize = 15;

/// An immutable block header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    /// Hash of the parent block.
    pub parent_hash: Hash,
    /// Hash of the uncle list.
    pub uncles_hash: Hash,
    /// Beneficiary of the block reward.
    pub coinbase: Address,
    /// State trie root after this block.
    pub state_root: Hash,
    /// Transaction trie root.
    pub transactions_root: Hash,
    /// Receipt trie root.
    pub receipts_root: Hash,
    /// Bloom filter over log addresses and topics.
    pub logs_bloom: Vec<u8>,
    /// Block difficulty.
    pub difficulty: U256,
    /// Block number.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Unix timestamp.
    pub timestamp: u64,
    /// Arbitrary extra data.
    pub extra_data: Vec<u8>,
    /// Mix hash.
    pub mix_hash: Hash,
    /// Proof-of-work nonce.
    pub nonce: [u8; 8],
    /// Trailing fields beyond the base schema, kept untouched.
    pub extra_fields: Vec<RlpNode>,
    /// Node this header was decoded from; `None` for locally built headers.
    pub raw: Option<RlpNode>,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            parent_hash: Hash::zero(),
            uncles_hash: Hash::zero(),
            coinbase: Address::zero(),
            state_root: Hash::zero(),
            transactions_root: Hash::zero(),
            receipts_root: Hash::zero(),
            logs_bloom: vec![0u8; LOGS_BLOOM_LEN],
            difficulty: U256::zero(),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Vec::new(),
            mix_hash: Hash::zero(),
            nonce: [0u8; 8],
            extra_fields: Vec::new(),
            raw: None,
        }
    }
}

impl BlockHeader {
    /// Decode a header from its list node.
    pub fn from_node(node: &RlpNode, strict_integers: bool) -> Result<Self, MessageError> {
        let f = Fields::new(node, "header", strict_integers)?;
        Ok(Self {
            parent_hash: f.hash(0, "parentHash")?,
            uncles_hash: f.hash(1, "unclesHash")?,
            coinbase: f.address(2, "coinbase")?,
            state_root: f.hash(3, "stateRoot")?,
            transactions_root: f.hash(4, "transactionsRoot")?,
            receipts_root: f.hash(5, "receiptsRoot")?,
            logs_bloom: f.fixed::<LOGS_BLOOM_LEN>(6, "logsBloom")?.to_vec(),
            difficulty: f.u256(7, "difficulty")?,
            number: f.u64(8, "number")?,
            gas_limit: f.u64(9, "gasLimit")?,
            gas_used: f.u64(10, "gasUsed")?,
            timestamp: f.u64(11, "timestamp")?,
            extra_data: f.bytes(12, "extraData")?.to_vec(),
            mix_hash: f.hash(13, "mixHash")?,
            nonce: f.fixed::<8>(14, "nonce")?,
            extra_fields: f.rest(REQUIRED_FIELDS).to_vec(),
            raw: Some(node.clone()),
        })
    }

    /// Canonical list node built from the fields, trailing fields included.
    pub fn to_node(&self) -> RlpNode {
        let mut items = vec![
            RlpNode::from_hash(&self.parent_hash),
            RlpNode::from_hash(&self.uncles_hash),
            RlpNode::from_address(Some(&self.coinbase)),
            RlpNode::from_hash(&self.state_root),
            RlpNode::from_hash(&self.transactions_root),
            RlpNode::from_hash(&self.receipts_root),
            RlpNode::bytes(self.logs_bloom.clone()),
            RlpNode::from_u256(self.difficulty),
            RlpNode::from_u64(self.number),
            RlpNode::from_u64(self.gas_limit),
            RlpNode::from_u64(self.gas_used),
            RlpNode::from_u64(self.timestamp),
            RlpNode::bytes(self.extra_data.clone()),
            RlpNode::from_hash(&self.mix_hash),
            RlpNode::bytes(self.nonce.to_vec()),
        ];
        items.extend(self.extra_fields.iter().cloned());
        RlpNode::list(items)
    }

    /// Keccak hash of the header as received, or of the canonical
    /// encoding for a locally built header.
    pub fn hash(&self) -> Hash {
        match &self.raw {
            Some(node) => keccak256(&encode(node)),
            None => keccak256(&encode(&self.to_node())),
        }
    }
}

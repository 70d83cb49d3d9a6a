//! Positional field access over a decoded list.

use super::errors::MessageError;
use lc_01_rlp_codec::{DecodeError, RlpNode};
use shared_types::{Address, Hash, U256};

/// Reads fixed-position children of a list node, attaching field names to
/// every failure.
pub struct Fields<'a> {
    items: &'a [RlpNode],
    strict_integers: bool,
}

impl<'a> Fields<'a> {
    /// View `node` as a list of fields; `what` names it in errors.
    pub fn new(
        node: &'a RlpNode,
        what: &'static str,
        strict_integers: bool,
    ) -> Result<Self, MessageError> {
        let items = node.as_list().map_err(|source| MessageError::Field {
            field: what,
            source,
        })?;
        Ok(Self {
            items,
            strict_integers,
        })
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Children past the first `count`.
    pub fn rest(&self, count: usize) -> &'a [RlpNode] {
        self.items.get(count..).unwrap_or(&[])
    }

    /// Raw child at `index`.
    pub fn node(&self, index: usize, field: &'static str) -> Result<&'a RlpNode, MessageError> {
        self.items
            .get(index)
            .ok_or(MessageError::MissingField { field, index })
    }

    /// Child at `index` as a byte string.
    pub fn bytes(&self, index: usize, field: &'static str) -> Result<&'a [u8], MessageError> {
        self.node(index, field)?
            .as_bytes()
            .map_err(|source| MessageError::Field { field, source })
    }

    /// Child at `index` as a list.
    pub fn list(&self, index: usize, field: &'static str) -> Result<&'a [RlpNode], MessageError> {
        self.node(index, field)?
            .as_list()
            .map_err(|source| MessageError::Field { field, source })
    }

    /// Child at `index` as `u64`.
    pub fn u64(&self, index: usize, field: &'static str) -> Result<u64, MessageError> {
        self.node(index, field)?
            .to_u64_with(self.strict_integers)
            .map_err(|source| MessageError::Field { field, source })
    }

    /// Child at `index` as `U256`.
    pub fn u256(&self, index: usize, field: &'static str) -> Result<U256, MessageError> {
        self.node(index, field)?
            .to_u256_with(self.strict_integers)
            .map_err(|source| MessageError::Field { field, source })
    }

    /// Child at `index` as a 32-byte hash.
    pub fn hash(&self, index: usize, field: &'static str) -> Result<Hash, MessageError> {
        self.node(index, field)?
            .as_hash()
            .map_err(|source| MessageError::Field { field, source })
    }

    /// Child at `index` as a required 20-byte address.
    pub fn address(&self, index: usize, field: &'static str) -> Result<Address, MessageError> {
        let bytes = self.bytes(index, field)?;
        if bytes.len() != 20 {
            return Err(MessageError::Field {
                field,
                source: DecodeError::InvalidLength {
                    expected: 20,
                    got: bytes.len(),
                },
            });
        }
        Ok(Address::from_slice(bytes))
    }

    /// Child at `index` as a byte string of exactly `N` bytes.
    pub fn fixed<const N: usize>(
        &self,
        index: usize,
        field: &'static str,
    ) -> Result<[u8; N], MessageError> {
        let bytes = self.bytes(index, field)?;
        bytes.try_into().map_err(|_| MessageError::Field {
            field,
            source: DecodeError::InvalidLength {
                expected: N,
                got: bytes.len(),
            },
        })
    }
}

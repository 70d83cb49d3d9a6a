//! # RLP Node
//!
//! The codec's data model: a byte string or an ordered list of nodes.

use super::errors::DecodeError;
use primitive_types::{H160, H256, U256};

/// Single bytes below this value encode as themselves.
pub const SINGLE_BYTE_THRESHOLD: u8 = 0x80;

/// Longest payload whose length fits in the prefix byte itself.
pub const MAX_SHORT_LENGTH: usize = 55;

/// A decoded (or to-be-encoded) item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpNode {
    /// Opaque byte string.
    Bytes(Vec<u8>),
    /// Ordered list of nested items.
    List(Vec<RlpNode>),
}

impl RlpNode {
    /// Byte-string node.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpNode::Bytes(data.into())
    }

    /// List node.
    pub fn list(items: Vec<RlpNode>) -> Self {
        RlpNode::List(items)
    }

    /// The empty byte string (encodes as `0x80`; also zero and "no address").
    pub fn empty() -> Self {
        RlpNode::Bytes(Vec::new())
    }

    /// Unsigned integer as minimal big-endian bytes (zero is empty).
    pub fn from_u64(value: u64) -> Self {
        RlpNode::Bytes(strip_leading_zeros(&value.to_be_bytes()).to_vec())
    }

    /// 256-bit unsigned integer as minimal big-endian bytes.
    pub fn from_u256(value: U256) -> Self {
        let mut buf = [0u8; 32];
        value.to_big_endian(&mut buf);
        RlpNode::Bytes(strip_leading_zeros(&buf).to_vec())
    }

    /// 32-byte hash.
    pub fn from_hash(hash: &H256) -> Self {
        RlpNode::Bytes(hash.as_bytes().to_vec())
    }

    /// Optional 20-byte address; `None` encodes as the empty string.
    pub fn from_address(address: Option<&H160>) -> Self {
        match address {
            Some(addr) => RlpNode::Bytes(addr.as_bytes().to_vec()),
            None => RlpNode::empty(),
        }
    }

    /// True for `Bytes`.
    pub fn is_bytes(&self) -> bool {
        matches!(self, RlpNode::Bytes(_))
    }

    /// True for `List`.
    pub fn is_list(&self) -> bool {
        matches!(self, RlpNode::List(_))
    }

    /// Borrow the byte string.
    pub fn as_bytes(&self) -> Result<&[u8], DecodeError> {
        match self {
            RlpNode::Bytes(b) => Ok(b),
            RlpNode::List(_) => Err(DecodeError::UnexpectedShape { expected: "bytes" }),
        }
    }

    /// Borrow the list items.
    pub fn as_list(&self) -> Result<&[RlpNode], DecodeError> {
        match self {
            RlpNode::List(items) => Ok(items),
            RlpNode::Bytes(_) => Err(DecodeError::UnexpectedShape { expected: "list" }),
        }
    }

    /// Interpret as `u64`, tolerating leading zero bytes.
    pub fn as_u64(&self) -> Result<u64, DecodeError> {
        self.to_u64_with(false)
    }

    /// Interpret as `u64`; with `strict`, leading zero bytes are rejected.
    pub fn to_u64_with(&self, strict: bool) -> Result<u64, DecodeError> {
        let digits = integer_digits(self.as_bytes()?, strict, 8)?;
        let mut buf = [0u8; 8];
        buf[8 - digits.len()..].copy_from_slice(digits);
        Ok(u64::from_be_bytes(buf))
    }

    /// Interpret as `U256`, tolerating leading zero bytes.
    pub fn as_u256(&self) -> Result<U256, DecodeError> {
        self.to_u256_with(false)
    }

    /// Interpret as `U256`; with `strict`, leading zero bytes are rejected.
    pub fn to_u256_with(&self, strict: bool) -> Result<U256, DecodeError> {
        let digits = integer_digits(self.as_bytes()?, strict, 32)?;
        Ok(U256::from_big_endian(digits))
    }

    /// Interpret as a 32-byte hash.
    pub fn as_hash(&self) -> Result<H256, DecodeError> {
        let bytes = self.as_bytes()?;
        if bytes.len() != 32 {
            return Err(DecodeError::InvalidLength {
                expected: 32,
                got: bytes.len(),
            });
        }
        Ok(H256::from_slice(bytes))
    }

    /// Interpret as an optional address (empty string is `None`).
    pub fn as_address(&self) -> Result<Option<H160>, DecodeError> {
        let bytes = self.as_bytes()?;
        match bytes.len() {
            0 => Ok(None),
            20 => Ok(Some(H160::from_slice(bytes))),
            got => Err(DecodeError::InvalidLength { expected: 20, got }),
        }
    }
}

impl From<Vec<u8>> for RlpNode {
    fn from(data: Vec<u8>) -> Self {
        RlpNode::Bytes(data)
    }
}

impl From<&[u8]> for RlpNode {
    fn from(data: &[u8]) -> Self {
        RlpNode::Bytes(data.to_vec())
    }
}

impl From<Vec<RlpNode>> for RlpNode {
    fn from(items: Vec<RlpNode>) -> Self {
        RlpNode::List(items)
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

/// Significant digits of a big-endian integer, checked against `max_bytes`.
fn integer_digits(bytes: &[u8], strict: bool, max_bytes: usize) -> Result<&[u8], DecodeError> {
    if strict && bytes.first() == Some(&0) {
        return Err(DecodeError::NonCanonical("integer with leading zero"));
    }
    let digits = strip_leading_zeros(bytes);
    if digits.len() > max_bytes {
        return Err(DecodeError::IntegerOverflow {
            len: digits.len(),
            max_bytes,
        });
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u64_minimal() {
        assert_eq!(RlpNode::from_u64(0), RlpNode::Bytes(vec![]));
        assert_eq!(RlpNode::from_u64(0x0f), RlpNode::Bytes(vec![0x0f]));
        assert_eq!(RlpNode::from_u64(1024), RlpNode::Bytes(vec![0x04, 0x00]));
    }

    #[test]
    fn test_from_u256_minimal() {
        assert_eq!(RlpNode::from_u256(U256::zero()), RlpNode::empty());
        assert_eq!(
            RlpNode::from_u256(U256::from(0x0102u64)),
            RlpNode::Bytes(vec![0x01, 0x02])
        );
    }

    #[test]
    fn test_as_u64_lenient_accepts_leading_zero() {
        let node = RlpNode::bytes(vec![0x00, 0x00, 0x07]);
        assert_eq!(node.as_u64(), Ok(7));
    }

    #[test]
    fn test_as_u64_strict_rejects_leading_zero() {
        let node = RlpNode::bytes(vec![0x00, 0x07]);
        assert!(matches!(
            node.to_u64_with(true),
            Err(DecodeError::NonCanonical(_))
        ));
    }

    #[test]
    fn test_as_u64_overflow() {
        let node = RlpNode::bytes(vec![1u8; 9]);
        assert_eq!(
            node.as_u64(),
            Err(DecodeError::IntegerOverflow {
                len: 9,
                max_bytes: 8
            })
        );
    }

    #[test]
    fn test_as_u64_on_list_is_shape_error() {
        let node = RlpNode::list(vec![]);
        assert_eq!(
            node.as_u64(),
            Err(DecodeError::UnexpectedShape { expected: "bytes" })
        );
    }

    #[test]
    fn test_as_u256_max() {
        let node = RlpNode::bytes(vec![0xff; 32]);
        assert_eq!(node.as_u256(), Ok(U256::MAX));
    }

    #[test]
    fn test_as_address() {
        assert_eq!(RlpNode::empty().as_address(), Ok(None));
        let addr = H160::repeat_byte(0xaa);
        assert_eq!(
            RlpNode::from_address(Some(&addr)).as_address(),
            Ok(Some(addr))
        );
        assert!(RlpNode::bytes(vec![1, 2, 3]).as_address().is_err());
    }

    #[test]
    fn test_as_hash_requires_32_bytes() {
        let hash = H256::repeat_byte(0x11);
        assert_eq!(RlpNode::from_hash(&hash).as_hash(), Ok(hash));
        assert_eq!(
            RlpNode::bytes(vec![0u8; 31]).as_hash(),
            Err(DecodeError::InvalidLength {
                expected: 32,
                got: 31
            })
        );
    }
}

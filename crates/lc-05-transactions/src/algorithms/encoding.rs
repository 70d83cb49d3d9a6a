//! # Legacy Transaction Encoding
//!
//! The nine-field legacy tuple `[nonce, gasPrice, gasLimit, to, value,
//! data, v, r, s]`. Before signing, `v, r, s` are replaced by
//! `chainId, 0, 0` (EIP-155).

use crate::domain::{RawTransaction, Signature, SigningError, TransactionError};
use lc_01_rlp_codec::{decode_exact, encode, RlpNode};
use shared_types::{keccak256, Hash};

fn base_fields(raw: &RawTransaction) -> Vec<RlpNode> {
    vec![
        RlpNode::from_u64(raw.nonce),
        RlpNode::from_u256(raw.gas_price),
        RlpNode::from_u64(raw.gas_limit),
        RlpNode::from_address(raw.to.as_ref()),
        RlpNode::from_u256(raw.value),
        RlpNode::bytes(raw.data.clone()),
    ]
}

/// Bytes whose keccak is signed.
pub fn signing_payload(raw: &RawTransaction, chain_id: u64) -> Vec<u8> {
    let mut fields = base_fields(raw);
    fields.extend([
        RlpNode::from_u64(chain_id),
        RlpNode::empty(),
        RlpNode::empty(),
    ]);
    encode(&RlpNode::list(fields))
}

/// Digest signed by the sender.
pub fn signing_hash(raw: &RawTransaction, chain_id: u64) -> Hash {
    keccak256(&signing_payload(raw, chain_id))
}

/// Broadcast payload.
pub fn encode_signed(
    raw: &RawTransaction,
    signature: &Signature,
    chain_id: u64,
) -> Result<Vec<u8>, SigningError> {
    let mut fields = base_fields(raw);
    fields.extend([
        RlpNode::from_u64(signature.v(chain_id)?),
        RlpNode::from_u256(signature.r),
        RlpNode::from_u256(signature.s),
    ]);
    Ok(encode(&RlpNode::list(fields)))
}

/// A parsed broadcast payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    /// Unsigned fields.
    pub raw: RawTransaction,
    /// Signature with the recovery id extracted from `v`.
    pub signature: Signature,
    /// Chain id from `v`; `None` for pre-EIP-155 payloads (`v` of 27 or 28).
    pub chain_id: Option<u64>,
}

impl DecodedTransaction {
    /// Digest the sender signed.
    pub fn signing_hash(&self) -> Hash {
        match self.chain_id {
            Some(chain_id) => signing_hash(&self.raw, chain_id),
            None => keccak256(&encode(&RlpNode::list(base_fields(&self.raw)))),
        }
    }
}

/// Parse a broadcast payload. Integers are read strictly.
pub fn decode_signed(bytes: &[u8]) -> Result<DecodedTransaction, TransactionError> {
    let node = decode_exact(bytes)?;
    let fields = node.as_list()?;
    if fields.len() != 9 {
        return Err(TransactionError::InvalidInput(format!(
            "expected 9 transaction fields, got {}",
            fields.len()
        )));
    }

    let v = fields[6].to_u64_with(true)?;
    let (recovery_id, chain_id) = match v {
        27 | 28 => ((v - 27) as u8, None),
        v if v >= 35 => (((v - 35) % 2) as u8, Some((v - 35) / 2)),
        v => {
            return Err(TransactionError::InvalidInput(format!(
                "invalid v value {v}"
            )))
        }
    };

    Ok(DecodedTransaction {
        raw: RawTransaction {
            nonce: fields[0].to_u64_with(true)?,
            gas_price: fields[1].to_u256_with(true)?,
            gas_limit: fields[2].to_u64_with(true)?,
            to: fields[3].as_address()?,
            value: fields[4].to_u256_with(true)?,
            data: fields[5].as_bytes()?.to_vec(),
        },
        signature: Signature {
            r: fields[7].to_u256_with(true)?,
            s: fields[8].to_u256_with(true)?,
            recovery_id,
        },
        chain_id,
    })
}

/// Transaction hash of a broadcast payload.
pub fn transaction_hash(encoded: &[u8]) -> Hash {
    keccak256(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, U256};

    // EIP-155 example transaction
    fn eip155_example() -> RawTransaction {
        RawTransaction {
            nonce: 9,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some(Address::repeat_byte(0x35)),
            value: U256::from(1_000_000_000_000_000_000u64),
            data: Vec::new(),
        }
    }

    #[test]
    fn test_eip155_signing_payload() {
        let payload = signing_payload(&eip155_example(), 1);
        assert_eq!(
            hex::encode(payload),
            "ec098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a764000080018080"
        );
    }

    #[test]
    fn test_eip155_signing_hash() {
        assert_eq!(
            hex::encode(signing_hash(&eip155_example(), 1)),
            "daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"
        );
    }

    #[test]
    fn test_contract_creation_encodes_empty_to() {
        let mut raw = eip155_example();
        raw.to = None;
        let sig = Signature {
            r: U256::one(),
            s: U256::from(2u64),
            recovery_id: 1,
        };
        let encoded = encode_signed(&raw, &sig, 5).unwrap();
        let decoded = decode_signed(&encoded).unwrap();
        assert_eq!(decoded.raw.to, None);
        assert_eq!(decoded.chain_id, Some(5));
        assert_eq!(decoded.signature, sig);
    }

    #[test]
    fn test_zero_value_encodes_empty() {
        let mut raw = eip155_example();
        raw.value = U256::zero();
        let sig = Signature {
            r: U256::one(),
            s: U256::one(),
            recovery_id: 0,
        };
        let decoded = decode_signed(&encode_signed(&raw, &sig, 1).unwrap()).unwrap();
        assert_eq!(decoded.raw.value, U256::zero());
    }

    #[test]
    fn test_oversized_chain_id_is_not_encoded() {
        let sig = Signature {
            r: U256::one(),
            s: U256::one(),
            recovery_id: 0,
        };
        let err = encode_signed(&eip155_example(), &sig, u64::MAX / 2 + 1).unwrap_err();
        assert!(matches!(err, SigningError::Malformed(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_arity() {
        let bytes = encode(&RlpNode::list(vec![RlpNode::from_u64(1)]));
        assert!(matches!(
            decode_signed(&bytes),
            Err(TransactionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decode_rejects_bad_v() {
        let mut fields = base_fields(&eip155_example());
        fields.extend([
            RlpNode::from_u64(30),
            RlpNode::from_u64(1),
            RlpNode::from_u64(1),
        ]);
        let bytes = encode(&RlpNode::list(fields));
        assert!(matches!(
            decode_signed(&bytes),
            Err(TransactionError::InvalidInput(_))
        ));
    }
}

//! # Codec Flows
//!
//! The RLP codec, the wire messages and transaction signing used together:
//! a transaction signed by `lc-05-transactions` must survive relay inside a
//! `SendTransaction` frame byte for byte, and decoder limits configured once
//! must apply at every layer.

#[cfg(test)]
mod tests {
    use crate::integration::support::TEST_KEY;
    use lc_01_rlp_codec::{encode, encode_into, DecodeError, RlpConfig, RlpNode};
    use lc_02_wire_messages::{
        frame, unframe, unframe_with, Decoded, MessageError, SendTransactionMessage, WireMessage,
    };
    use lc_05_transactions::{
        decode_signed, encode_signed, recover_signer, transaction_hash, RawTransaction,
        TransactionSigner,
    };
    use shared_types::{keccak256, Address, Hash, U256};

    fn transfer(nonce: u64) -> RawTransaction {
        RawTransaction {
            nonce,
            gas_price: U256::from(20_000_000_000u64),
            gas_limit: 21_000,
            to: Some(Address::repeat_byte(0x35)),
            value: U256::exp10(18),
            data: Vec::new(),
        }
    }

    fn relayed(bytes: &[u8], config: &RlpConfig) -> Result<SendTransactionMessage, MessageError> {
        match unframe_with(bytes, config)? {
            Decoded::Message(WireMessage::SendTransaction(msg)) => Ok(msg),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn test_signed_transaction_survives_relay() {
        let signer = TransactionSigner::from_hex(TEST_KEY).unwrap();
        let encoded: Vec<Vec<u8>> = (9..12)
            .map(|nonce| {
                let raw = transfer(nonce);
                let signature = signer.sign(&raw, 1).unwrap();
                encode_signed(&raw, &signature, 1).unwrap()
            })
            .collect();

        let msg = SendTransactionMessage::from_encoded(7, &encoded).unwrap();
        let bytes = frame(&WireMessage::SendTransaction(msg));
        let relayed = relayed(&bytes, &RlpConfig::for_testing()).unwrap();

        assert_eq!(relayed.request_id, 7);
        assert_eq!(relayed.transactions.len(), 3);
        for (node, original) in relayed.transactions.iter().zip(&encoded) {
            let reencoded = encode(node);
            assert_eq!(&reencoded, original);
            assert_eq!(transaction_hash(&reencoded), keccak256(original));

            let decoded = decode_signed(&reencoded).unwrap();
            assert_eq!(decoded.chain_id, Some(1));
            let from = recover_signer(&decoded.signing_hash(), &decoded.signature).unwrap();
            assert_eq!(from, signer.address());
        }
    }

    #[test]
    fn test_integer_strictness_follows_config() {
        // Announce with headNumber written as 0x0005
        let body = RlpNode::list(vec![
            RlpNode::from_hash(&Hash::repeat_byte(0x11)),
            RlpNode::bytes(vec![0x00, 0x05]),
            RlpNode::from_u64(1),
            RlpNode::from_u64(0),
        ]);
        let mut bytes = Vec::new();
        encode_into(&RlpNode::from_u64(0x01), &mut bytes);
        encode_into(&body, &mut bytes);

        let err = unframe_with(&bytes, &RlpConfig::for_testing()).unwrap_err();
        assert_eq!(err.field(), Some("headNumber"));

        match unframe(&bytes).unwrap() {
            Decoded::Message(WireMessage::Announce(msg)) => assert_eq!(msg.head_number, 5),
            other => panic!("unexpected decode result: {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit_applies_to_relayed_transactions() {
        let mut nested = RlpNode::list(vec![RlpNode::from_u64(1)]);
        for _ in 0..10 {
            nested = RlpNode::list(vec![nested]);
        }
        let msg = SendTransactionMessage {
            request_id: 1,
            transactions: vec![nested],
        };
        let bytes = frame(&WireMessage::SendTransaction(msg));

        let err = relayed(&bytes, &RlpConfig::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            MessageError::Payload(DecodeError::DepthExceeded { max: 8 })
        ));
        assert!(relayed(&bytes, &RlpConfig::default()).is_ok());
    }

    #[test]
    fn test_unknown_code_is_left_alone() {
        let mut bytes = Vec::new();
        encode_into(&RlpNode::from_u64(0x15), &mut bytes);
        // body is not even valid RLP
        bytes.extend_from_slice(&[0xff, 0xff]);
        assert_eq!(unframe(&bytes).unwrap(), Decoded::Unrecognized(0x15));
    }
}

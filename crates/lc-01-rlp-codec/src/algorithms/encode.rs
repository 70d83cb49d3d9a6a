//! # Encoding
//!
//! Nodes to canonical bytes. Encoding cannot fail.

use crate::domain::{RlpNode, MAX_SHORT_LENGTH, SINGLE_BYTE_THRESHOLD};

const STRING_OFFSET: u8 = 0x80;
const LONG_STRING_OFFSET: u8 = 0xb7;
const LIST_OFFSET: u8 = 0xc0;
const LONG_LIST_OFFSET: u8 = 0xf7;

/// Encode a node.
pub fn encode(node: &RlpNode) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(node, &mut out);
    out
}

/// Encode a node, appending to `out`.
pub fn encode_into(node: &RlpNode, out: &mut Vec<u8>) {
    match node {
        RlpNode::Bytes(data) => {
            if data.len() == 1 && data[0] < SINGLE_BYTE_THRESHOLD {
                out.push(data[0]);
            } else {
                write_prefix(out, data.len(), STRING_OFFSET, LONG_STRING_OFFSET);
                out.extend_from_slice(data);
            }
        }
        RlpNode::List(items) => {
            let mut payload = Vec::new();
            for item in items {
                encode_into(item, &mut payload);
            }
            write_prefix(out, payload.len(), LIST_OFFSET, LONG_LIST_OFFSET);
            out.extend(payload);
        }
    }
}

fn write_prefix(out: &mut Vec<u8>, len: usize, short_offset: u8, long_offset: u8) {
    if len <= MAX_SHORT_LENGTH {
        out.push(short_offset + len as u8);
    } else {
        let len_bytes = encode_length(len);
        out.push(long_offset + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

/// Encode a length as minimal big-endian bytes.
fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

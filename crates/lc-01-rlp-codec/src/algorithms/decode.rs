//! # Decoding
//!
//! Canonical bytes to nodes, with truncation, canonical-form, depth and size
//! checks. The decoder is a pure function over its input slice; a failure
//! leaves nothing behind.

use crate::config::RlpConfig;
use crate::domain::{DecodeError, RlpNode, MAX_SHORT_LENGTH, SINGLE_BYTE_THRESHOLD};
use tracing::debug;

/// Decode one item from the front of `input` with default limits.
///
/// Returns the node and the number of bytes it occupied.
pub fn decode(input: &[u8]) -> Result<(RlpNode, usize), DecodeError> {
    decode_with(input, &RlpConfig::default())
}

/// Decode one item from the front of `input` with explicit limits.
pub fn decode_with(input: &[u8], config: &RlpConfig) -> Result<(RlpNode, usize), DecodeError> {
    decode_item(input, config, 0).inspect_err(|e| {
        debug!(error = %e, input_len = input.len(), "[lc-01] Decode rejected");
    })
}

/// Decode `input` as exactly one item with default limits.
pub fn decode_exact(input: &[u8]) -> Result<RlpNode, DecodeError> {
    decode_exact_with(input, &RlpConfig::default())
}

/// Decode `input` as exactly one item; leftover bytes are an error.
pub fn decode_exact_with(input: &[u8], config: &RlpConfig) -> Result<RlpNode, DecodeError> {
    let (node, consumed) = decode_with(input, config)?;
    if consumed != input.len() {
        return Err(DecodeError::TrailingBytes {
            consumed,
            total: input.len(),
        });
    }
    Ok(node)
}

fn decode_item(
    input: &[u8],
    config: &RlpConfig,
    depth: usize,
) -> Result<(RlpNode, usize), DecodeError> {
    let prefix = *input.first().ok_or(DecodeError::Truncated {
        needed: 1,
        available: 0,
    })?;

    match prefix {
        0x00..=0x7f => Ok((RlpNode::Bytes(vec![prefix]), 1)),
        0x80..=0xb7 => {
            let len = (prefix - 0x80) as usize;
            let data = take(input, 1, len)?;
            if len == 1 && data[0] < SINGLE_BYTE_THRESHOLD {
                return Err(DecodeError::NonCanonical(
                    "single byte below 0x80 must encode as itself",
                ));
            }
            Ok((RlpNode::Bytes(data.to_vec()), 1 + len))
        }
        0xb8..=0xbf => {
            let (len, header) = read_long_length(input, (prefix - 0xb7) as usize, config)?;
            let data = take(input, header, len)?;
            Ok((RlpNode::Bytes(data.to_vec()), header + len))
        }
        0xc0..=0xf7 => {
            let len = (prefix - 0xc0) as usize;
            decode_list(input, 1, len, config, depth)
        }
        0xf8..=0xff => {
            let (len, header) = read_long_length(input, (prefix - 0xf7) as usize, config)?;
            decode_list(input, header, len, config, depth)
        }
    }
}

fn decode_list(
    input: &[u8],
    header: usize,
    len: usize,
    config: &RlpConfig,
    depth: usize,
) -> Result<(RlpNode, usize), DecodeError> {
    if depth >= config.max_depth {
        return Err(DecodeError::DepthExceeded {
            max: config.max_depth,
        });
    }
    let payload = take(input, header, len)?;

    let mut items = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let (item, used) = decode_item(&payload[pos..], config, depth + 1)?;
        items.push(item);
        pos += used;
    }
    Ok((RlpNode::List(items), header + len))
}

/// Read a long-form length of `len_of_len` bytes following the prefix.
///
/// Returns the declared length and the total header size.
fn read_long_length(
    input: &[u8],
    len_of_len: usize,
    config: &RlpConfig,
) -> Result<(usize, usize), DecodeError> {
    let len_bytes = take(input, 1, len_of_len)?;
    if len_bytes[0] == 0 {
        return Err(DecodeError::NonCanonical("length with leading zero byte"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(DecodeError::PayloadTooLarge {
            len: usize::MAX,
            max: config.max_payload,
        });
    }

    let len = len_bytes
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len <= MAX_SHORT_LENGTH {
        return Err(DecodeError::NonCanonical(
            "long-form length used for a short payload",
        ));
    }
    if len > config.max_payload {
        return Err(DecodeError::PayloadTooLarge {
            len,
            max: config.max_payload,
        });
    }
    Ok((len, 1 + len_of_len))
}

/// Borrow `len` bytes starting at `offset`, or report truncation.
fn take(input: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeError> {
    let end = offset.checked_add(len).ok_or(DecodeError::PayloadTooLarge {
        len,
        max: usize::MAX,
    })?;
    input.get(offset..end).ok_or(DecodeError::Truncated {
        needed: end,
        available: input.len(),
    })
}

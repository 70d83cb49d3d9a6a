//! # Messages
//!
//! One module per message variant plus the code-keyed dispatch table.

mod announce;
mod block_headers;
mod get_block_headers;
mod send_transaction;
mod status;

pub use announce::AnnounceMessage;
pub use block_headers::BlockHeadersMessage;
pub use get_block_headers::{BlockRef, GetBlockHeadersMessage};
pub use send_transaction::SendTransactionMessage;
pub use status::StatusMessage;

use crate::domain::MessageError;
use lc_01_rlp_codec::{decode_exact_with, decode_with, encode_into, RlpConfig, RlpNode};
use std::fmt;
use tracing::trace;

/// Numeric discriminator written ahead of every body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageCode {
    /// 0x00
    Status,
    /// 0x01
    Announce,
    /// 0x02
    GetBlockHeaders,
    /// 0x03
    BlockHeaders,
    /// 0x13
    SendTransaction,
}

impl MessageCode {
    /// Wire value.
    pub const fn as_u64(self) -> u64 {
        match self {
            MessageCode::Status => 0x00,
            MessageCode::Announce => 0x01,
            MessageCode::GetBlockHeaders => 0x02,
            MessageCode::BlockHeaders => 0x03,
            MessageCode::SendTransaction => 0x13,
        }
    }

    /// Look up a wire value; `None` for codes this crate does not model.
    pub fn from_u64(code: u64) -> Option<Self> {
        DECODERS
            .iter()
            .find(|(c, _)| c.as_u64() == code)
            .map(|(c, _)| *c)
    }
}

impl fmt::Display for MessageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02x})", self, self.as_u64())
    }
}

/// Any message this crate can decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireMessage {
    /// Handshake.
    Status(StatusMessage),
    /// New head.
    Announce(AnnounceMessage),
    /// Header request.
    GetBlockHeaders(GetBlockHeadersMessage),
    /// Header response.
    BlockHeaders(BlockHeadersMessage),
    /// Transaction relay.
    SendTransaction(SendTransactionMessage),
}

impl WireMessage {
    /// Discriminator for this variant.
    pub fn code(&self) -> MessageCode {
        match self {
            WireMessage::Status(_) => MessageCode::Status,
            WireMessage::Announce(_) => MessageCode::Announce,
            WireMessage::GetBlockHeaders(_) => MessageCode::GetBlockHeaders,
            WireMessage::BlockHeaders(_) => MessageCode::BlockHeaders,
            WireMessage::SendTransaction(_) => MessageCode::SendTransaction,
        }
    }

    /// Body as a list node.
    pub fn to_node(&self) -> RlpNode {
        match self {
            WireMessage::Status(m) => m.to_node(),
            WireMessage::Announce(m) => m.to_node(),
            WireMessage::GetBlockHeaders(m) => m.to_node(),
            WireMessage::BlockHeaders(m) => m.to_node(),
            WireMessage::SendTransaction(m) => m.to_node(),
        }
    }
}

/// Outcome of dispatching a payload by code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// A known message.
    Message(WireMessage),
    /// Code not modelled here. The payload was left undecoded.
    Unrecognized(u64),
}

type DecodeFn = fn(&RlpNode, bool) -> Result<WireMessage, MessageError>;

fn decode_status(node: &RlpNode, strict: bool) -> Result<WireMessage, MessageError> {
    StatusMessage::from_node(node, strict).map(WireMessage::Status)
}

fn decode_announce(node: &RlpNode, strict: bool) -> Result<WireMessage, MessageError> {
    AnnounceMessage::from_node(node, strict).map(WireMessage::Announce)
}

fn decode_get_block_headers(node: &RlpNode, strict: bool) -> Result<WireMessage, MessageError> {
    GetBlockHeadersMessage::from_node(node, strict).map(WireMessage::GetBlockHeaders)
}

fn decode_block_headers(node: &RlpNode, strict: bool) -> Result<WireMessage, MessageError> {
    BlockHeadersMessage::from_node(node, strict).map(WireMessage::BlockHeaders)
}

fn decode_send_transaction(node: &RlpNode, strict: bool) -> Result<WireMessage, MessageError> {
    SendTransactionMessage::from_node(node, strict).map(WireMessage::SendTransaction)
}

const DECODERS: &[(MessageCode, DecodeFn)] = &[
    (MessageCode::Status, decode_status),
    (MessageCode::Announce, decode_announce),
    (MessageCode::GetBlockHeaders, decode_get_block_headers),
    (MessageCode::BlockHeaders, decode_block_headers),
    (MessageCode::SendTransaction, decode_send_transaction),
];

/// Decode `payload` as the body of message `code` with default limits.
pub fn decode_message(code: u64, payload: &[u8]) -> Result<Decoded, MessageError> {
    decode_message_with(code, payload, &RlpConfig::default())
}

/// Decode `payload` as the body of message `code`.
///
/// The payload is decoded exactly once into a single node; trailing bytes
/// are an error.
pub fn decode_message_with(
    code: u64,
    payload: &[u8],
    config: &RlpConfig,
) -> Result<Decoded, MessageError> {
    let Some((_, decoder)) = DECODERS.iter().find(|(c, _)| c.as_u64() == code) else {
        trace!(code, "[lc-02] unrecognized message code");
        return Ok(Decoded::Unrecognized(code));
    };
    let node = decode_exact_with(payload, config)?;
    decoder(&node, config.strict_integers).map(Decoded::Message)
}

/// Serialize a message as `RLP(code) ‖ RLP(body)`.
pub fn frame(message: &WireMessage) -> Vec<u8> {
    let mut out = Vec::new();
    encode_into(&RlpNode::from_u64(message.code().as_u64()), &mut out);
    encode_into(&message.to_node(), &mut out);
    out
}

/// Split a frame into code and body and dispatch, with default limits.
pub fn unframe(bytes: &[u8]) -> Result<Decoded, MessageError> {
    unframe_with(bytes, &RlpConfig::default())
}

/// Split a frame into code and body and dispatch.
///
/// The code itself is always read strictly.
pub fn unframe_with(bytes: &[u8], config: &RlpConfig) -> Result<Decoded, MessageError> {
    let (code_node, consumed) = decode_with(bytes, config)?;
    let code = code_node
        .to_u64_with(true)
        .map_err(|source| MessageError::Field {
            field: "code",
            source,
        })?;
    decode_message_with(code, &bytes[consumed..], config)
}

//! # Algorithms Module
//!
//! Pure encode/decode functions over `RlpNode`.

pub mod decode;
pub mod encode;

pub use decode::{decode, decode_exact, decode_exact_with, decode_with};
pub use encode::{encode, encode_into};

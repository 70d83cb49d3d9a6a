//! # Transaction Signer (secp256k1)
//!
//! Holds the account's secret key and produces EIP-155 signatures.
//!
//! ## Security Notes
//!
//! - Nonces are derived per RFC 6979, so the same key and transaction always
//!   give the same `(r, s, recoveryId)`
//! - S is normalised to the lower half of the curve order (EIP-2)
//! - Secret key material is zeroized on drop
//! - `Debug` prints the address only

use super::entities::{RawTransaction, Signature};
use super::errors::SigningError;
use crate::algorithms::signing_hash;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, SigningKey, VerifyingKey};
use shared_types::{keccak256, Address, Hash, U256};
use std::fmt;
use zeroize::{Zeroize, Zeroizing};

/// Signing key for one account.
pub struct TransactionSigner {
    key: SigningKey,
    address: Address,
}

impl TransactionSigner {
    /// Load from a 32-byte secret.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, SigningError> {
        let key = SigningKey::from_slice(secret).map_err(|_| SigningError::InvalidKey)?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Load from a hex secret, with or without `0x`.
    pub fn from_hex(secret: &str) -> Result<Self, SigningError> {
        let trimmed = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = Zeroizing::new(hex::decode(trimmed).map_err(|_| SigningError::InvalidKey)?);
        Self::from_bytes(&bytes)
    }

    /// Sender address: last 20 bytes of keccak of the uncompressed public key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign `raw` for `chain_id`.
    pub fn sign(&self, raw: &RawTransaction, chain_id: u64) -> Result<Signature, SigningError> {
        self.sign_hash(&signing_hash(raw, chain_id))
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &Hash) -> Result<Signature, SigningError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_bytes())
            .map_err(|e| SigningError::Malformed(e.to_string()))?;

        // Flipping S mirrors R's y coordinate, so the parity flips with it
        let (signature, recovery_id) = match signature.normalize_s() {
            Some(low) => (
                low,
                RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
                    .ok_or(SigningError::RecoveryFailed)?,
            ),
            None => (signature, recovery_id),
        };
        if recovery_id.is_x_reduced() {
            return Err(SigningError::RecoveryFailed);
        }

        let bytes = signature.to_bytes();
        Ok(Signature {
            r: U256::from_big_endian(&bytes[..32]),
            s: U256::from_big_endian(&bytes[32..]),
            recovery_id: recovery_id.to_byte(),
        })
    }
}

impl fmt::Debug for TransactionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 prefix
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_bytes()[12..])
}

/// Recover the address that produced `signature` over `hash`.
pub fn recover_signer(hash: &Hash, signature: &Signature) -> Result<Address, SigningError> {
    let recovery_id =
        RecoveryId::from_byte(signature.recovery_id).ok_or(SigningError::RecoveryFailed)?;

    let mut bytes = [0u8; 64];
    signature.r.to_big_endian(&mut bytes[..32]);
    signature.s.to_big_endian(&mut bytes[32..]);
    let parsed = EcdsaSignature::from_slice(&bytes);
    bytes.zeroize();
    let parsed = parsed.map_err(|e| SigningError::Malformed(e.to_string()))?;

    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &parsed, recovery_id)
        .map_err(|_| SigningError::RecoveryFailed)?;
    Ok(address_of(&key))
}

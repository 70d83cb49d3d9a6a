//! # Transaction Pipeline
//!
//! `build_raw` → `sign` → `encode` → `Syncer::submit` → registry.
//!
//! Sends are serialised so two concurrent sends never fetch the same nonce.

use crate::algorithms::{encode_signed, transaction_hash};
use crate::config::TransactionConfig;
use crate::domain::{
    RawTransaction, SendRequest, SentTransaction, Signature, TransactionError, TransactionSigner,
};
use crate::ports::TransactionRegistry;
use lc_03_syncer::{CallRequest, Syncer};
use shared_types::{Address, U256};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Builds, signs and broadcasts transactions for one account.
pub struct TransactionPipeline {
    signer: Arc<TransactionSigner>,
    syncer: Arc<dyn Syncer>,
    registry: Arc<dyn TransactionRegistry>,
    config: TransactionConfig,
    send_lock: tokio::sync::Mutex<()>,
}

impl TransactionPipeline {
    /// Create a pipeline.
    pub fn new(
        signer: Arc<TransactionSigner>,
        syncer: Arc<dyn Syncer>,
        registry: Arc<dyn TransactionRegistry>,
        config: TransactionConfig,
    ) -> Self {
        Self {
            signer,
            syncer,
            registry,
            config,
            send_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Sender address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Chain id signatures are bound to.
    pub fn chain_id(&self) -> u64 {
        self.config.chain_id
    }

    /// Build the unsigned transaction. Without an explicit nonce, one fetch
    /// is made; a failure is returned as is.
    pub async fn build_raw(&self, request: &SendRequest) -> Result<RawTransaction, TransactionError> {
        let nonce = match request.nonce {
            Some(nonce) => nonce,
            None => {
                let nonce = self.syncer.fetch_nonce(self.signer.address()).await?;
                debug!(nonce, "[lc-05] nonce fetched");
                nonce
            }
        };
        Ok(RawTransaction {
            nonce,
            gas_price: request.gas_price,
            gas_limit: request.gas_limit,
            to: request.to,
            value: request.value,
            data: request.data.clone(),
        })
    }

    /// Sign `raw` for the configured chain.
    pub fn sign(&self, raw: &RawTransaction) -> Result<Signature, TransactionError> {
        Ok(self.signer.sign(raw, self.config.chain_id)?)
    }

    /// Broadcast payload for `raw` signed with `signature`.
    pub fn encode(
        &self,
        raw: &RawTransaction,
        signature: &Signature,
    ) -> Result<Vec<u8>, TransactionError> {
        Ok(encode_signed(raw, signature, self.config.chain_id)?)
    }

    /// Gas needed for a transaction with these parameters.
    ///
    /// Without a recipient the configured default is returned and nothing
    /// is sent. A zero value is replaced by the placeholder amount for the
    /// estimation call only.
    pub async fn estimate_gas(
        &self,
        to: Option<Address>,
        value: U256,
        gas_price: Option<U256>,
        data: Vec<u8>,
    ) -> Result<u64, TransactionError> {
        let Some(to) = to else {
            debug!(
                gas = self.config.default_gas_limit,
                "[lc-05] no recipient, default gas limit"
            );
            return Ok(self.config.default_gas_limit);
        };

        let value = if value.is_zero() {
            self.config.estimate_placeholder_value
        } else {
            value
        };
        let gas = self
            .syncer
            .estimate_gas(CallRequest {
                from: Some(self.signer.address()),
                to: Some(to),
                value,
                gas_price,
                data,
            })
            .await?;
        debug!(gas, to = %to, "[lc-05] gas estimated");
        Ok(gas)
    }

    /// Build, sign, encode and submit, then register the transaction as
    /// pending. Any failure is returned with its original kind and nothing
    /// is registered.
    pub async fn send(&self, request: SendRequest) -> Result<SentTransaction, TransactionError> {
        let _serial = self.send_lock.lock().await;

        let raw = self.build_raw(&request).await?;
        let signature = self.sign(&raw)?;
        let encoded = self.encode(&raw, &signature)?;
        let hash = transaction_hash(&encoded);

        let remote = match self.syncer.submit(encoded.clone()).await {
            Ok(remote) => remote,
            Err(err) => {
                warn!(error = %err, nonce = raw.nonce, "[lc-05] submission failed");
                return Err(err.into());
            }
        };
        if remote != hash {
            warn!(local = %hash, remote = %remote, "[lc-05] provider reported a different hash");
        }

        let sent = SentTransaction {
            hash,
            raw,
            signature,
            encoded,
        };
        self.registry
            .register(sent.to_record(self.signer.address(), unix_now()));
        info!(hash = %hash, nonce = sent.raw.nonce, "[lc-05] transaction sent");
        Ok(sent)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::decode_signed;
    use crate::ports::RecordingRegistry;
    use lc_03_syncer::{MockSyncer, SyncerError};
    use shared_types::{keccak256, ErrorKind};

    const KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";
    const BOB: Address = Address::repeat_byte(0xb0);

    struct Harness {
        syncer: Arc<MockSyncer>,
        registry: Arc<RecordingRegistry>,
        pipeline: TransactionPipeline,
    }

    fn harness() -> Harness {
        let syncer = Arc::new(MockSyncer::new());
        let registry = Arc::new(RecordingRegistry::new());
        let pipeline = TransactionPipeline::new(
            Arc::new(TransactionSigner::from_hex(KEY).unwrap()),
            syncer.clone(),
            registry.clone(),
            TransactionConfig::for_testing(),
        );
        Harness {
            syncer,
            registry,
            pipeline,
        }
    }

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::from(1_000_000_000u64)
    }

    #[tokio::test]
    async fn test_estimate_without_recipient_is_local() {
        let h = harness();
        let gas = h
            .pipeline
            .estimate_gas(None, U256::from(5u64), Some(gwei(1)), Vec::new())
            .await
            .unwrap();
        assert_eq!(gas, 21_000);
        assert!(h.syncer.estimates().is_empty());
    }

    #[tokio::test]
    async fn test_estimate_zero_value_uses_placeholder() {
        let h = harness();
        h.syncer.set_gas_estimate(46_000);
        let gas = h
            .pipeline
            .estimate_gas(Some(BOB), U256::zero(), Some(gwei(1)), vec![0xa9])
            .await
            .unwrap();
        assert_eq!(gas, 46_000);

        let calls = h.syncer.estimates();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].value, U256::one());
        assert_eq!(calls[0].to, Some(BOB));
        assert_eq!(calls[0].from, Some(h.pipeline.address()));
    }

    #[tokio::test]
    async fn test_estimate_nonzero_value_passes_through() {
        let h = harness();
        h.pipeline
            .estimate_gas(Some(BOB), U256::from(7u64), None, Vec::new())
            .await
            .unwrap();
        assert_eq!(h.syncer.estimates()[0].value, U256::from(7u64));
    }

    #[tokio::test]
    async fn test_send_zero_value_keeps_zero() {
        let h = harness();
        h.pipeline
            .estimate_gas(Some(BOB), U256::zero(), Some(gwei(1)), Vec::new())
            .await
            .unwrap();
        let sent = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::zero(), gwei(1), 21_000))
            .await
            .unwrap();

        assert_eq!(sent.raw.value, U256::zero());
        let submitted = h.syncer.submitted();
        let decoded = decode_signed(&submitted[0]).unwrap();
        assert_eq!(decoded.raw.value, U256::zero());
        assert_eq!(decoded.chain_id, Some(1337));
    }

    #[tokio::test]
    async fn test_send_fetches_nonce_once() {
        let h = harness();
        h.syncer.set_nonce(12);
        let sent = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(2), 21_000))
            .await
            .unwrap();
        assert_eq!(sent.raw.nonce, 12);
        assert_eq!(h.syncer.nonce_fetches(), 1);
    }

    #[tokio::test]
    async fn test_send_with_explicit_nonce_skips_fetch() {
        let h = harness();
        let sent = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(2), 21_000).with_nonce(40))
            .await
            .unwrap();
        assert_eq!(sent.raw.nonce, 40);
        assert_eq!(h.syncer.nonce_fetches(), 0);
    }

    #[tokio::test]
    async fn test_send_registers_pending_record() {
        let h = harness();
        let sent = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(3u64), gwei(2), 21_000).with_data(vec![1, 2]))
            .await
            .unwrap();

        assert_eq!(sent.hash, keccak256(&h.syncer.submitted()[0]));
        let records = h.registry.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].hash, sent.hash);
        assert_eq!(records[0].from, h.pipeline.address());
        assert_eq!(records[0].input, vec![1, 2]);
        assert!(records[0].status.is_pending());
    }

    #[tokio::test]
    async fn test_remote_rejection_is_returned_unregistered() {
        let h = harness();
        h.syncer.reject_submissions(Some(SyncerError::RemoteRejected {
            code: -32000,
            message: "transaction underpriced".into(),
        }));
        let err = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(1), 21_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(h.registry.records().is_empty());
    }

    #[tokio::test]
    async fn test_nonce_failure_stops_before_submit() {
        let h = harness();
        h.syncer
            .fail_reads(Some(SyncerError::Connectivity("unreachable".into())));
        let err = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(1), 21_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity);
        assert_eq!(h.syncer.nonce_fetches(), 1);
        assert!(h.syncer.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_chain_id_fails_before_submit() {
        let syncer = Arc::new(MockSyncer::new());
        let registry = Arc::new(RecordingRegistry::new());
        let pipeline = TransactionPipeline::new(
            Arc::new(TransactionSigner::from_hex(KEY).unwrap()),
            syncer.clone(),
            registry.clone(),
            TransactionConfig {
                chain_id: u64::MAX / 2 + 1,
                ..TransactionConfig::default()
            },
        );
        let err = pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(1), 21_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Signing);
        assert!(syncer.submitted().is_empty());
        assert!(registry.records().is_empty());
    }

    #[tokio::test]
    async fn test_signature_matches_sender() {
        let h = harness();
        let sent = h
            .pipeline
            .send(SendRequest::transfer(BOB, U256::from(1u64), gwei(1), 21_000))
            .await
            .unwrap();
        let decoded = decode_signed(&sent.encoded).unwrap();
        let signer = crate::domain::recover_signer(&decoded.signing_hash(), &decoded.signature)
            .unwrap();
        assert_eq!(signer, h.pipeline.address());
    }
}

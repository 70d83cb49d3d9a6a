//! # Light Wallet
//!
//! The facade over the light-client subsystems.
//!
//! ## Wiring
//!
//! ```text
//!  Transports ─▶ build_syncer ─▶ Arc<dyn Syncer> ─┬─▶ BlockchainStateMachine ─▶ streams
//!                                                 └─▶ TransactionPipeline ──┐
//!                                                         StateRegistry ◀───┘
//! ```
//!
//! The syncer is resolved once, at build time.

use crate::adapters::StateRegistry;
use crate::config::WalletConfig;
use crate::domain::WalletError;
use lc_03_syncer::{build_syncer, Log, LogFilter, Syncer, TransactionReceipt, Transports};
use lc_04_blockchain_state::{BlockchainStateMachine, InMemoryStateStorage, StateStorage};
use lc_05_transactions::{SendRequest, SentTransaction, TransactionPipeline, TransactionSigner};
use shared_bus::StateStream;
use shared_types::{
    AccountState, Address, Hash, NetworkId, SyncState, TransactionRecord, U256,
};
use std::sync::Arc;
use tracing::info;

/// Assembles a `LightWallet`.
pub struct WalletBuilder {
    config: WalletConfig,
    signer: Option<TransactionSigner>,
    transports: Transports,
    syncer: Option<Arc<dyn Syncer>>,
    storage: Option<Arc<dyn StateStorage>>,
}

impl WalletBuilder {
    /// Start from `config`.
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            signer: None,
            transports: Transports::default(),
            syncer: None,
            storage: None,
        }
    }

    /// Account key. Required.
    pub fn signer(mut self, signer: TransactionSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Transport collaborators for the configured provider.
    pub fn transports(mut self, transports: Transports) -> Self {
        self.transports = transports;
        self
    }

    /// Use `syncer` instead of resolving one from the provider config.
    pub fn syncer(mut self, syncer: Arc<dyn Syncer>) -> Self {
        self.syncer = Some(syncer);
        self
    }

    /// Persistence; in-memory when not set.
    pub fn storage(mut self, storage: Arc<dyn StateStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Validate the config and wire everything together.
    pub fn build(self) -> Result<LightWallet, WalletError> {
        self.config.validate()?;
        let signer = Arc::new(self.signer.ok_or(WalletError::MissingInput("signer"))?);

        let syncer = match self.syncer {
            Some(syncer) => syncer,
            None => build_syncer(
                &self.config.provider,
                &self.config.syncer,
                &self.config.rlp,
                self.transports,
            )?,
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStateStorage::new()));

        let state = Arc::new(BlockchainStateMachine::new(
            signer.address(),
            self.config.network,
            Arc::clone(&syncer),
            storage,
            self.config.state.clone(),
        )?);
        let pipeline = TransactionPipeline::new(
            Arc::clone(&signer),
            Arc::clone(&syncer),
            Arc::new(StateRegistry::new(Arc::clone(&state))),
            self.config.transactions.clone(),
        );

        info!(
            address = %signer.address(),
            network = %self.config.network,
            provider = self.config.provider.kind(),
            "[lc-06] wallet built"
        );
        Ok(LightWallet {
            config: self.config,
            syncer,
            state,
            pipeline,
        })
    }
}

/// Single-account light wallet.
pub struct LightWallet {
    config: WalletConfig,
    syncer: Arc<dyn Syncer>,
    state: Arc<BlockchainStateMachine>,
    pipeline: TransactionPipeline,
}

impl LightWallet {
    /// Shorthand for `WalletBuilder::new`.
    pub fn builder(config: WalletConfig) -> WalletBuilder {
        WalletBuilder::new(config)
    }

    /// Begin syncing. Idempotent.
    pub async fn start(&self) -> Result<(), WalletError> {
        Ok(self.state.start().await?)
    }

    /// Stop syncing and forget height and balance. Idempotent.
    pub async fn stop(&self) {
        self.state.stop().await;
    }

    /// Resync now without restarting.
    pub async fn refresh(&self) -> Result<(), WalletError> {
        Ok(self.state.refresh().await?)
    }

    /// Forward a reachability signal to the provider.
    pub fn set_reachable(&self, reachable: bool) {
        self.syncer.set_reachable(reachable);
    }

    /// Sign and broadcast.
    pub async fn send(&self, request: SendRequest) -> Result<SentTransaction, WalletError> {
        Ok(self.pipeline.send(request).await?)
    }

    /// Gas needed for a transaction with these parameters.
    pub async fn estimate_gas(
        &self,
        to: Option<Address>,
        value: U256,
        gas_price: Option<U256>,
        data: Vec<u8>,
    ) -> Result<u64, WalletError> {
        Ok(self.pipeline.estimate_gas(to, value, gas_price, data).await?)
    }

    /// Address this wallet receives at and sends from.
    pub fn receive_address(&self) -> Address {
        self.pipeline.address()
    }

    /// Network the wallet is attached to.
    pub fn network(&self) -> NetworkId {
        self.config.network
    }

    /// Effective configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// True between `start` and `stop`.
    pub fn is_started(&self) -> bool {
        self.state.is_started()
    }

    /// Last known balance.
    pub fn balance(&self) -> Option<U256> {
        self.state.balance()
    }

    /// Last known block height.
    pub fn last_block_height(&self) -> Option<u64> {
        self.state.last_block_height()
    }

    /// Height and balance together.
    pub fn account_state(&self) -> AccountState {
        self.state.account_state()
    }

    /// Current sync state.
    pub fn sync_state(&self) -> SyncState {
        self.state.sync_state()
    }

    /// Page of history, newest first.
    pub fn transactions(&self, from_hash: Option<Hash>, limit: usize) -> Vec<TransactionRecord> {
        self.state.transactions(from_hash, limit)
    }

    /// Known transaction by hash.
    pub fn transaction(&self, hash: &Hash) -> Option<TransactionRecord> {
        self.state.transaction(hash)
    }

    /// Receipt from the network.
    pub async fn transaction_receipt(
        &self,
        hash: Hash,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        Ok(self.state.transaction_receipt(hash).await?)
    }

    /// Network nonce of the account.
    pub async fn transaction_count(&self) -> Result<u64, WalletError> {
        Ok(self.state.transaction_count().await?)
    }

    /// Logs matching `filter`.
    pub async fn logs(&self, filter: LogFilter) -> Result<Vec<Log>, WalletError> {
        Ok(self.syncer.fetch_logs(filter).await?)
    }

    /// Height changes. Opening a new stream ends the previous one.
    pub fn height_updates(&self) -> StateStream<u64> {
        self.state.height_updates().into_stream()
    }

    /// Balance changes.
    pub fn balance_updates(&self) -> StateStream<U256> {
        self.state.balance_updates().into_stream()
    }

    /// Sync state transitions.
    pub fn sync_state_updates(&self) -> StateStream<SyncState> {
        self.state.sync_state_updates().into_stream()
    }

    /// History snapshots.
    pub fn transactions_updates(&self) -> StateStream<Vec<TransactionRecord>> {
        self.state.transaction_updates().into_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc_03_syncer::{MockSyncer, SyncerError, SyncerEvent};
    use shared_types::{ErrorKind, NotSyncedReason};
    use std::time::Duration;
    use tokio_stream::StreamExt;

    const KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";

    fn wallet() -> (Arc<MockSyncer>, LightWallet) {
        let syncer = Arc::new(MockSyncer::new());
        let wallet = LightWallet::builder(WalletConfig::for_testing())
            .signer(TransactionSigner::from_hex(KEY).unwrap())
            .syncer(syncer.clone())
            .build()
            .unwrap();
        (syncer, wallet)
    }

    async fn next<T: Clone + Send + 'static>(stream: &mut StateStream<T>) -> T {
        tokio::time::timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("timed out waiting for update")
            .expect("stream closed")
    }

    #[test]
    fn test_build_requires_signer() {
        let result = LightWallet::builder(WalletConfig::for_testing())
            .syncer(Arc::new(MockSyncer::new()))
            .build();
        assert!(matches!(result, Err(WalletError::MissingInput("signer"))));
    }

    #[test]
    fn test_build_requires_transport() {
        let result = LightWallet::builder(WalletConfig::for_testing())
            .signer(TransactionSigner::from_hex(KEY).unwrap())
            .build();
        assert!(matches!(
            result,
            Err(WalletError::Syncer(SyncerError::MissingTransport("polling")))
        ));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = WalletConfig::for_testing();
        config.transactions.chain_id = 1;
        let result = LightWallet::builder(config)
            .signer(TransactionSigner::from_hex(KEY).unwrap())
            .syncer(Arc::new(MockSyncer::new()))
            .build();
        assert!(matches!(result, Err(WalletError::Config(_))));
    }

    #[tokio::test]
    async fn test_tracks_signer_address() {
        let (syncer, wallet) = wallet();
        wallet.start().await.unwrap();
        assert_eq!(syncer.tracked_address(), Some(wallet.receive_address()));
        assert_eq!(wallet.network(), NetworkId::DEV);
    }

    #[tokio::test]
    async fn test_send_updates_transactions_stream() {
        let (syncer, wallet) = wallet();
        let mut txs = wallet.transactions_updates();
        wallet.start().await.unwrap();

        let sent = wallet
            .send(SendRequest::transfer(
                Address::repeat_byte(0xb0),
                U256::from(10u64),
                U256::from(1_000_000_000u64),
                21_000,
            ))
            .await
            .unwrap();

        let listed = next(&mut txs).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].hash, sent.hash);
        assert_eq!(wallet.transaction(&sent.hash).map(|r| r.nonce), Some(0));
        assert_eq!(syncer.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_send_rejection_keeps_kind() {
        let (syncer, wallet) = wallet();
        syncer.reject_submissions(Some(SyncerError::RemoteRejected {
            code: -32000,
            message: "nonce too low".into(),
        }));
        let err = wallet
            .send(SendRequest::transfer(
                Address::repeat_byte(0xb0),
                U256::one(),
                U256::one(),
                21_000,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(wallet.transactions(None, 10).is_empty());
    }

    #[tokio::test]
    async fn test_stop_reports_not_synced() {
        let (syncer, wallet) = wallet();
        let mut states = wallet.sync_state_updates();
        wallet.start().await.unwrap();
        syncer.emit(SyncerEvent::SyncState(SyncState::Synced));
        assert_eq!(next(&mut states).await, SyncState::Syncing(None));
        assert_eq!(next(&mut states).await, SyncState::Synced);

        wallet.stop().await;
        assert_eq!(
            next(&mut states).await,
            SyncState::NotSynced(NotSyncedReason::NotStarted)
        );
        assert!(!wallet.is_started());
        assert!(wallet.account_state().is_empty());
    }

    #[tokio::test]
    async fn test_new_stream_ends_the_previous_one() {
        let (syncer, wallet) = wallet();
        let mut first = wallet.height_updates();
        let mut second = wallet.height_updates();
        assert_eq!(second.category(), shared_bus::UpdateCategory::Height);

        wallet.start().await.unwrap();
        syncer.emit(SyncerEvent::Height(3));
        assert_eq!(next(&mut second).await, 3);
        assert_eq!(first.next().await, None);
    }

    #[tokio::test]
    async fn test_refresh_before_start() {
        let (_syncer, wallet) = wallet();
        let err = wallet.refresh().await.unwrap_err();
        assert!(matches!(err, WalletError::State(_)));
    }
}

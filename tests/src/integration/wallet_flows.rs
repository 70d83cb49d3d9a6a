//! # Wallet Flows
//!
//! `LightWallet` over the polling provider, end to end:
//!
//! 1. start → height, balance and `Synced` on their own streams
//! 2. send → pending record on the transactions stream
//! 3. receipt appears and the head moves → record confirmed
//! 4. stop → `NotSynced(NotStarted)`, in-memory account cleared
//!
//! Storage is shared across wallet instances to check what survives a
//! restart.

#[cfg(test)]
mod tests {
    use crate::integration::support::{next, until, TEST_KEY};
    use lc_03_syncer::{
        Log, LogFilter, MockRpcClient, RpcRequest, SyncerError, TransactionReceipt, Transports,
    };
    use lc_04_blockchain_state::InMemoryStateStorage;
    use lc_05_transactions::{decode_signed, SendRequest, TransactionSigner};
    use lc_06_wallet::{LightWallet, WalletConfig};
    use shared_types::{
        Address, ErrorKind, Hash, NotSyncedReason, SyncState, TransactionStatus, U256,
    };
    use std::sync::Arc;

    const BOB: Address = Address::repeat_byte(0xb0);

    fn signer() -> TransactionSigner {
        TransactionSigner::from_hex(TEST_KEY).unwrap()
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn gwei(n: u64) -> U256 {
        U256::from(n) * U256::exp10(9)
    }

    /// Chain at height 100 where our account holds 5 ether and has sent 3.
    fn chain() -> Arc<MockRpcClient> {
        let client = Arc::new(MockRpcClient::new());
        let me = signer().address();
        client.set_height(100);
        client.set_balance(me, ether(5));
        client.set_nonce(me, 3);
        client
    }

    fn polling_wallet(client: &Arc<MockRpcClient>) -> LightWallet {
        LightWallet::builder(WalletConfig::for_testing())
            .signer(signer())
            .transports(Transports::rpc(client.clone()))
            .build()
            .unwrap()
    }

    fn receipt(hash: Hash, block_number: u64, success: bool) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: hash,
            block_number,
            gas_used: 21_000,
            success,
            logs: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_wallet_lifecycle() {
        let client = chain();
        let wallet = polling_wallet(&client);
        let mut heights = wallet.height_updates();
        let mut balances = wallet.balance_updates();
        let mut states = wallet.sync_state_updates();
        let mut history = wallet.transactions_updates();

        wallet.start().await.unwrap();
        assert_eq!(next(&mut heights).await, 100);
        assert_eq!(next(&mut balances).await, ether(5));
        until(&mut states, |s| s.is_synced()).await;
        assert_eq!(wallet.balance(), Some(ether(5)));

        // send picks up the network nonce
        let sent = wallet
            .send(SendRequest::transfer(BOB, ether(1), gwei(20), 21_000))
            .await
            .unwrap();
        assert_eq!(sent.raw.nonce, 3);
        let listed = next(&mut history).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].hash, sent.hash);
        assert!(listed[0].status.is_pending());

        // the provider saw exactly what was signed
        let submitted = client
            .calls()
            .into_iter()
            .find_map(|call| match call {
                RpcRequest::SendRawTransaction(raw) => Some(raw),
                _ => None,
            })
            .unwrap();
        let decoded = decode_signed(&submitted).unwrap();
        assert_eq!(decoded.raw.to, Some(BOB));
        assert_eq!(decoded.chain_id, Some(1337));

        // included in the next block
        client.with_chain(|c| c.receipts.insert(sent.hash, receipt(sent.hash, 101, true)));
        client.set_height(101);
        wallet.refresh().await.unwrap();

        until(&mut heights, |h| *h == 101).await;
        let confirmed = until(&mut history, |list| !list[0].status.is_pending()).await;
        assert_eq!(
            confirmed[0].status,
            TransactionStatus::Confirmed { block_number: 101 }
        );
        assert_eq!(
            wallet.transaction(&sent.hash).map(|r| r.status),
            Some(TransactionStatus::Confirmed { block_number: 101 })
        );

        wallet.stop().await;
        until(&mut states, |s| {
            *s == SyncState::NotSynced(NotSyncedReason::NotStarted)
        })
        .await;
        assert!(wallet.account_state().is_empty());
        assert!(!wallet.is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_transaction_is_failed() {
        let client = chain();
        let wallet = polling_wallet(&client);
        let mut history = wallet.transactions_updates();
        wallet.start().await.unwrap();

        let sent = wallet
            .send(SendRequest::transfer(BOB, ether(1), gwei(20), 21_000))
            .await
            .unwrap();
        next(&mut history).await;

        client.with_chain(|c| c.receipts.insert(sent.hash, receipt(sent.hash, 104, false)));
        client.set_height(104);
        wallet.refresh().await.unwrap();

        let updated = until(&mut history, |list| !list[0].status.is_pending()).await;
        assert_eq!(updated[0].status, TransactionStatus::Failed { block_number: 104 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_network_parks_polling() {
        let client = chain();
        let wallet = polling_wallet(&client);
        let mut heights = wallet.height_updates();
        let mut states = wallet.sync_state_updates();
        wallet.start().await.unwrap();
        until(&mut states, |s| s.is_synced()).await;

        wallet.set_reachable(false);
        until(&mut states, |s| {
            *s == SyncState::NotSynced(NotSyncedReason::NoConnection)
        })
        .await;

        client.set_height(250);
        wallet.set_reachable(true);
        until(&mut heights, |h| *h == 250).await;
        until(&mut states, |s| s.is_synced()).await;
        assert_eq!(wallet.last_block_height(), Some(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_survives_restart() {
        let client = chain();
        let storage = Arc::new(InMemoryStateStorage::new());

        let first = LightWallet::builder(WalletConfig::for_testing())
            .signer(signer())
            .transports(Transports::rpc(client.clone()))
            .storage(storage.clone())
            .build()
            .unwrap();
        let mut balances = first.balance_updates();
        first.start().await.unwrap();
        next(&mut balances).await;
        let sent = first
            .send(SendRequest::transfer(BOB, ether(2), gwei(20), 21_000))
            .await
            .unwrap();
        first.stop().await;
        drop(first);

        let second = LightWallet::builder(WalletConfig::for_testing())
            .signer(signer())
            .transports(Transports::rpc(client.clone()))
            .storage(storage)
            .build()
            .unwrap();
        // last known values come back before any sync
        assert!(!second.is_started());
        assert_eq!(second.last_block_height(), Some(100));
        assert_eq!(second.balance(), Some(ether(5)));
        let history = second.transactions(None, 10);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].hash, sent.hash);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_send_leaves_history_untouched() {
        let client = chain();
        client.with_chain(|c| {
            c.submit_error = Some(SyncerError::RemoteRejected {
                code: -32000,
                message: "replacement transaction underpriced".into(),
            })
        });
        let wallet = polling_wallet(&client);
        wallet.start().await.unwrap();

        let err = wallet
            .send(SendRequest::transfer(BOB, ether(1), gwei(1), 21_000))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        assert!(wallet.transactions(None, 10).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_and_logs_go_through_provider() {
        let client = chain();
        let token = Address::repeat_byte(0x70);
        client.with_chain(|c| {
            c.gas_estimate = 52_000;
            c.logs.push(Log {
                address: token,
                topics: vec![Hash::repeat_byte(0xdd)],
                block_number: Some(90),
                ..Default::default()
            });
            c.logs.push(Log {
                address: Address::repeat_byte(0x71),
                block_number: Some(90),
                ..Default::default()
            });
        });
        let wallet = polling_wallet(&client);

        let gas = wallet
            .estimate_gas(Some(token), U256::zero(), Some(gwei(1)), vec![0xa9, 0x05])
            .await
            .unwrap();
        assert_eq!(gas, 52_000);
        let estimated_value = client.calls().into_iter().find_map(|call| match call {
            RpcRequest::EstimateGas(call) => Some(call.value),
            _ => None,
        });
        assert_eq!(estimated_value, Some(U256::one()));

        // contract creation never asks the provider
        let creation = wallet
            .estimate_gas(None, U256::zero(), None, vec![0x60, 0x80])
            .await
            .unwrap();
        assert_eq!(creation, 21_000);
        assert_eq!(client.call_count("eth_estimateGas"), 1);

        let logs = wallet
            .logs(LogFilter::range(80, 100).with_address(token))
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].topics, vec![Hash::repeat_byte(0xdd)]);
    }
}

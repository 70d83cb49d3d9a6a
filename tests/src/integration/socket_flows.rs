//! # Socket Flows
//!
//! `LightWallet` over the persistent-socket provider. Head updates arrive
//! as pushed frames, including framed light-protocol messages from
//! `lc-02-wire-messages`, and a dropped connection is recovered without
//! restarting the wallet.

#[cfg(test)]
mod tests {
    use crate::integration::support::{next, until, TEST_KEY};
    use lc_02_wire_messages::{
        frame, AnnounceMessage, BlockHeader, BlockHeadersMessage, WireMessage,
    };
    use lc_03_syncer::{
        MockRpcClient, MockSocketTransport, ProviderConfig, SocketFrame, Transports,
    };
    use lc_05_transactions::{SendRequest, TransactionSigner};
    use lc_06_wallet::{LightWallet, WalletConfig};
    use shared_types::{Address, Hash, SyncState, U256};
    use std::sync::Arc;
    use std::time::Duration;

    fn signer() -> TransactionSigner {
        TransactionSigner::from_hex(TEST_KEY).unwrap()
    }

    fn socket_wallet() -> (Arc<MockRpcClient>, Arc<MockSocketTransport>, LightWallet) {
        let chain = Arc::new(MockRpcClient::new());
        chain.set_height(700);
        chain.set_balance(signer().address(), U256::from(9_000u64));
        let socket = Arc::new(MockSocketTransport::new(chain.clone()));

        let mut config = WalletConfig::for_testing();
        config.provider = ProviderConfig::Socket {
            endpoint: "ws://127.0.0.1:8546".to_string(),
        };
        let wallet = LightWallet::builder(config)
            .signer(signer())
            .transports(Transports::socket(socket.clone()))
            .build()
            .unwrap();
        (chain, socket, wallet)
    }

    fn headers(numbers: &[u64]) -> Vec<u8> {
        frame(&WireMessage::BlockHeaders(BlockHeadersMessage {
            request_id: 9,
            buffer_value: 1_000,
            headers: numbers
                .iter()
                .map(|&number| BlockHeader {
                    number,
                    ..Default::default()
                })
                .collect(),
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_reports_synced_with_values() {
        let (_chain, socket, wallet) = socket_wallet();
        let mut heights = wallet.height_updates();
        let mut balances = wallet.balance_updates();
        let mut states = wallet.sync_state_updates();

        wallet.start().await.unwrap();
        assert_eq!(next(&mut states).await, SyncState::Syncing(None));
        until(&mut states, |s| s.is_synced()).await;
        assert_eq!(next(&mut heights).await, 700);
        assert_eq!(next(&mut balances).await, U256::from(9_000u64));
        assert_eq!(socket.connect_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pushed_frames_move_the_head() {
        let (chain, socket, wallet) = socket_wallet();
        let mut heights = wallet.height_updates();
        let mut balances = wallet.balance_updates();
        wallet.start().await.unwrap();
        assert_eq!(next(&mut heights).await, 700);
        assert_eq!(next(&mut balances).await, U256::from(9_000u64));

        // the highest header in a batch wins
        socket.push_frame(SocketFrame::Wire(headers(&[702, 701])));
        assert_eq!(next(&mut heights).await, 702);

        // announcements carry the head directly, and a new head refreshes
        // the balance
        chain.set_balance(signer().address(), U256::from(8_500u64));
        socket.push_frame(SocketFrame::Wire(frame(&WireMessage::Announce(
            AnnounceMessage {
                head_hash: Hash::repeat_byte(0x03),
                head_number: 703,
                head_td: U256::from(1u64),
                reorg_depth: 0,
                updates: Vec::new(),
            },
        ))));
        assert_eq!(next(&mut heights).await, 703);
        assert_eq!(next(&mut balances).await, U256::from(8_500u64));

        // garbage is dropped without disturbing the stream
        socket.push_frame(SocketFrame::Wire(vec![0xc3, 0x01]));
        socket.push_frame(SocketFrame::NewHead(704));
        assert_eq!(next(&mut heights).await, 704);
        assert!(wallet.sync_state().is_synced());
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_header_range_leaves_height() {
        let (_chain, socket, wallet) = socket_wallet();
        let mut heights = wallet.height_updates();
        wallet.start().await.unwrap();
        assert_eq!(next(&mut heights).await, 700);

        // a response to an earlier range request
        socket.push_frame(SocketFrame::Wire(headers(&[640, 641, 642])));
        socket.push_frame(SocketFrame::NewHead(701));
        assert_eq!(next(&mut heights).await, 701);
        assert_eq!(wallet.last_block_height(), Some(701));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_connection_recovers() {
        let (chain, socket, wallet) = socket_wallet();
        let mut heights = wallet.height_updates();
        let mut states = wallet.sync_state_updates();
        wallet.start().await.unwrap();
        until(&mut states, |s| s.is_synced()).await;

        socket.set_refusing(true);
        socket.drop_connection("connection reset");
        until(&mut states, |s| s.is_syncing()).await;

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(socket.connect_attempts() >= 2);
        assert!(wallet.sync_state().is_syncing());

        chain.set_height(710);
        socket.set_refusing(false);
        until(&mut states, |s| s.is_synced()).await;
        until(&mut heights, |h| *h == 710).await;
        assert!(wallet.is_started());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_goes_over_the_socket() {
        let (_chain, socket, wallet) = socket_wallet();
        let mut states = wallet.sync_state_updates();
        let mut history = wallet.transactions_updates();
        wallet.start().await.unwrap();
        until(&mut states, |s| s.is_synced()).await;

        let sent = wallet
            .send(SendRequest::transfer(
                Address::repeat_byte(0xb0),
                U256::from(100u64),
                U256::from(1_000_000_000u64),
                21_000,
            ))
            .await
            .unwrap();

        assert_eq!(socket.sent_count("eth_getTransactionCount"), 1);
        assert_eq!(socket.sent_count("eth_sendRawTransaction"), 1);
        assert_eq!(next(&mut history).await[0].hash, sent.hash);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_closes_the_socket() {
        let (_chain, socket, wallet) = socket_wallet();
        let mut states = wallet.sync_state_updates();
        wallet.start().await.unwrap();
        until(&mut states, |s| s.is_synced()).await;

        wallet.stop().await;
        assert!(!socket.is_connected());
        assert!(wallet.last_block_height().is_none());
    }
}

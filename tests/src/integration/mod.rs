//! # Integration Flows
//!
//! Every flow drives the public surface with the in-memory collaborators
//! from `lc-03-syncer` and paused tokio time, so nothing touches a network.

pub mod codec_flows;
pub mod socket_flows;
pub mod wallet_flows;

#[cfg(test)]
pub(crate) mod support {
    use shared_bus::StateStream;
    use std::time::Duration;
    use tokio_stream::StreamExt;

    /// Key of the EIP-155 reference vector.
    pub const TEST_KEY: &str = "4646464646464646464646464646464646464646464646464646464646464646";

    /// Next update, failing the test if none arrives in time.
    pub async fn next<T: Clone + Send + 'static>(stream: &mut StateStream<T>) -> T {
        tokio::time::timeout(Duration::from_secs(60), stream.next())
            .await
            .expect("timed out waiting for update")
            .expect("stream closed")
    }

    /// Consume updates until one satisfies `want`, returning it.
    pub async fn until<T, F>(stream: &mut StateStream<T>, want: F) -> T
    where
        T: Clone + Send + 'static,
        F: Fn(&T) -> bool,
    {
        loop {
            let value = next(stream).await;
            if want(&value) {
                return value;
            }
        }
    }
}

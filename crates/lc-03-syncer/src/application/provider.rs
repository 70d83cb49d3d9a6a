//! # Provider Resolution
//!
//! Turns the configured provider into the single `Syncer` the rest of the
//! client talks to. This is the only place that knows which concrete
//! provider is in use.

use crate::adapters::{PollingSyncer, SocketSyncer};
use crate::config::{ProviderConfig, SyncerConfig};
use crate::domain::SyncerError;
use crate::ports::{RpcClient, SocketTransport, Syncer};
use lc_01_rlp_codec::RlpConfig;
use std::sync::Arc;
use tracing::info;

/// Transport collaborators available to the client.
#[derive(Clone, Default)]
pub struct Transports {
    /// Remote-procedure collaborator for the polling provider.
    pub rpc: Option<Arc<dyn RpcClient>>,
    /// Socket collaborator for the persistent-socket provider.
    pub socket: Option<Arc<dyn SocketTransport>>,
}

impl Transports {
    /// Only a remote-procedure collaborator.
    pub fn rpc(client: Arc<dyn RpcClient>) -> Self {
        Self {
            rpc: Some(client),
            socket: None,
        }
    }

    /// Only a socket collaborator.
    pub fn socket(transport: Arc<dyn SocketTransport>) -> Self {
        Self {
            rpc: None,
            socket: Some(transport),
        }
    }
}

/// Build the syncer selected by `provider`.
pub fn build_syncer(
    provider: &ProviderConfig,
    config: &SyncerConfig,
    rlp: &RlpConfig,
    transports: Transports,
) -> Result<Arc<dyn Syncer>, SyncerError> {
    info!(
        kind = provider.kind(),
        endpoint = provider.endpoint(),
        "[lc-03] resolving provider"
    );
    match provider {
        ProviderConfig::Polling { .. } => {
            let client = transports.rpc.ok_or(SyncerError::MissingTransport("polling"))?;
            Ok(Arc::new(PollingSyncer::new(client, config.clone())))
        }
        ProviderConfig::Socket { .. } => {
            let socket = transports
                .socket
                .ok_or(SyncerError::MissingTransport("socket"))?;
            Ok(Arc::new(SocketSyncer::new(socket, config.clone(), rlp.clone())))
        }
    }
}

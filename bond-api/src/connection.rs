//! Blockchain connection management
//!
//! Lazily builds the client/contract/executor triple, caches it, and rebuilds
//! it when the cached client stops answering. The primary RPC endpoint is
//! tried first, then the fallback.

use chain_clients_evm::address::to_checksum_address;
use chain_clients_evm::EvmClient;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::contract::BondContract;
use crate::executor::TransactionExecutor;

/// Live connection shared by the handlers of one request.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub client: Arc<EvmClient>,
    pub contract: BondContract,
    pub executor: TransactionExecutor,
}

/// Owns the cached connection.
#[derive(Debug)]
pub struct ConnectionManager {
    config: Arc<Config>,
    cached: RwLock<Option<ConnectionHandle>>,
}

impl ConnectionManager {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            cached: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a live connection, connecting or reconnecting as needed.
    ///
    /// Never fails: `None` means no contract is configured or no endpoint
    /// answered. Without a contract address no RPC request is made.
    pub async fn ensure_connected(&self) -> Option<ConnectionHandle> {
        let contract_address = self.config.blockchain.contract_address()?;

        let cached = self.cached.read().await.clone();
        if let Some(handle) = cached {
            if handle.client.is_connected().await {
                return Some(handle);
            }
            warn!(
                "Cached connection to {} is no longer responding, reconnecting",
                handle.client.base_url()
            );
        }

        let handle = self.connect(contract_address).await;
        *self.cached.write().await = handle.clone();
        handle
    }

    /// Reports `(blockchain_connected, contract_bound)` for the cached connection.
    pub async fn status(&self) -> (bool, bool) {
        let cached = self.cached.read().await.clone();
        match cached {
            Some(handle) => (handle.client.is_connected().await, true),
            None => (false, false),
        }
    }

    async fn connect(&self, contract_address: &str) -> Option<ConnectionHandle> {
        let contract_address = match to_checksum_address(contract_address) {
            Ok(address) => address,
            Err(e) => {
                error!("Invalid contract address {}: {:#}", contract_address, e);
                return None;
            }
        };

        let client = self.connect_client().await?;
        let sender = self.resolve_sender(&client).await;
        let blockchain = &self.config.blockchain;

        let contract = BondContract::new(client.clone(), &contract_address);
        let executor = TransactionExecutor::new(
            client.clone(),
            &contract_address,
            sender,
            blockchain.receipt_timeout(),
            blockchain.receipt_poll_interval(),
        );

        info!(
            "Bound bond contract {} on {}",
            contract_address,
            client.base_url()
        );
        Some(ConnectionHandle {
            client,
            contract,
            executor,
        })
    }

    /// Tries the primary endpoint, then the fallback.
    async fn connect_client(&self) -> Option<Arc<EvmClient>> {
        let blockchain = &self.config.blockchain;
        let timeout = blockchain.connect_timeout();

        info!("Connecting to blockchain at {}", blockchain.rpc_url);
        match probe(&blockchain.rpc_url, timeout).await {
            Ok(client) => {
                info!("Successfully connected to blockchain");
                return Some(client);
            }
            Err(e) => warn!(
                "Failed to connect to {} ({}), trying fallback provider {}",
                blockchain.rpc_url, e, blockchain.fallback_rpc_url
            ),
        }

        match probe(&blockchain.fallback_rpc_url, timeout).await {
            Ok(client) => {
                info!("Successfully connected to fallback provider");
                Some(client)
            }
            Err(e) => {
                error!("Blockchain connection error: {}", e);
                None
            }
        }
    }

    /// Picks the transaction sender: configured owner, else the node's first account.
    async fn resolve_sender(&self, client: &EvmClient) -> Option<String> {
        if let Some(owner) = self.config.blockchain.owner_address() {
            match to_checksum_address(owner) {
                Ok(address) => return Some(address),
                Err(e) => warn!("Ignoring invalid owner address {}: {:#}", owner, e),
            }
        }

        match client.accounts().await {
            Ok(accounts) => {
                let sender = accounts.into_iter().next();
                match &sender {
                    Some(account) => debug!("Using node account {} as sender", account),
                    None => warn!("Node reports no accounts, sending without a from address"),
                }
                sender
            }
            Err(e) => {
                warn!("Failed to list node accounts: {:#}", e);
                None
            }
        }
    }
}

async fn probe(url: &str, timeout: std::time::Duration) -> anyhow::Result<Arc<EvmClient>> {
    let client = EvmClient::with_timeout(url, timeout)?;
    if !client.is_connected().await {
        anyhow::bail!("{} did not answer eth_blockNumber", url);
    }
    Ok(Arc::new(client))
}

//! EVM JSON-RPC client
//!
//! Thin client over an EVM node's JSON-RPC API. Covers read-only contract
//! calls, gas estimation, node-signed transaction submission and receipt
//! polling.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::abi;

/// Default HTTP timeout applied to every JSON-RPC request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API RESPONSE STRUCTURES
// ============================================================================

/// EVM JSON-RPC request wrapper
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// EVM JSON-RPC response wrapper
///
/// `result` stays a raw value; a `null` result (e.g. a pending receipt) is
/// left for the caller's target type to interpret.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// EVM event log entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EvmLog {
    /// Address of the contract that emitted the event
    #[serde(default)]
    pub address: String,
    /// Array of topics (indexed event parameters, topic 0 is the event signature)
    #[serde(default)]
    pub topics: Vec<String>,
    /// Event data (non-indexed parameters)
    #[serde(default)]
    pub data: String,
    /// Block number (JSON-RPC uses camelCase: blockNumber)
    #[serde(rename = "blockNumber", default)]
    pub block_number: Option<String>,
    /// Transaction hash (JSON-RPC uses camelCase: transactionHash)
    #[serde(rename = "transactionHash", default)]
    pub transaction_hash: Option<String>,
    /// Log index (JSON-RPC uses camelCase: logIndex)
    #[serde(rename = "logIndex", default)]
    pub log_index: Option<String>,
}

/// Transaction receipt returned by eth_getTransactionReceipt
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionReceipt {
    /// Transaction hash
    #[serde(rename = "transactionHash")]
    pub transaction_hash: String,
    /// Execution status ("0x1" = success, "0x0" = reverted)
    #[serde(default)]
    pub status: Option<String>,
    /// Logs emitted during execution
    #[serde(default)]
    pub logs: Vec<EvmLog>,
    /// Block the transaction was included in
    #[serde(rename = "blockNumber", default)]
    pub block_number: Option<String>,
    /// Gas consumed by the transaction
    #[serde(rename = "gasUsed", default)]
    pub gas_used: Option<String>,
}

impl TransactionReceipt {
    /// Returns true when the receipt reports successful execution.
    pub fn is_success(&self) -> bool {
        self.status
            .as_deref()
            .and_then(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
            == Some(1)
    }
}

/// Parameters for eth_estimateGas / eth_sendTransaction
///
/// The node holds the sender's key; `from` selects the unlocked account.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: String,
    /// `0x`-prefixed calldata
    pub data: String,
    /// `0x`-prefixed hex gas limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
}

impl TransactionRequest {
    /// Creates a contract call request without a gas limit.
    pub fn new(from: Option<&str>, to: &str, calldata: &[u8]) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.to_string(),
            data: format!("0x{}", hex::encode(calldata)),
            gas: None,
        }
    }

    /// Returns a copy of this request with an explicit gas limit.
    pub fn with_gas(mut self, gas: u64) -> Self {
        self.gas = Some(format!("0x{:x}", gas));
        self
    }
}

// ============================================================================
// EVM CLIENT IMPLEMENTATION
// ============================================================================

/// Client for communicating with an EVM-compatible node via JSON-RPC
#[derive(Debug, Clone)]
pub struct EvmClient {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the EVM node (e.g., "http://127.0.0.1:8545")
    base_url: String,
}

impl EvmClient {
    /// Creates a new EVM client with the default 30 second request timeout.
    ///
    /// # Arguments
    ///
    /// * `node_url` - Base URL of the EVM node (e.g., "http://127.0.0.1:8545")
    ///
    /// # Returns
    ///
    /// * `Ok(EvmClient)` - Successfully created client
    /// * `Err(anyhow::Error)` - Failed to create client
    pub fn new(node_url: &str) -> Result<Self> {
        Self::with_timeout(node_url, DEFAULT_TIMEOUT)
    }

    /// Creates a new EVM client with a custom request timeout.
    pub fn with_timeout(node_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: node_url.to_string(),
        })
    }

    /// Returns the base URL of this client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a JSON-RPC request and deserializes the `result` field.
    async fn json_rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let response: JsonRpcResponse = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", method, self.base_url))?
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response from {}", method, self.base_url))?;

        if let Some(error) = response.error {
            return Err(anyhow::anyhow!(
                "JSON-RPC error from {}: {} (code: {})",
                self.base_url,
                error.message,
                error.code
            ));
        }

        serde_json::from_value(response.result)
            .with_context(|| format!("Failed to deserialize {} result", method))
    }

    /// Gets the current block number
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - Current block number
    /// * `Err(anyhow::Error)` - Failed to query block number
    pub async fn get_block_number(&self) -> Result<u64> {
        let block_hex: String = self.json_rpc("eth_blockNumber", vec![]).await?;
        parse_hex_u64(&block_hex).context("Failed to parse block number")
    }

    /// Reports whether the node answers JSON-RPC requests.
    ///
    /// Never fails; any error is treated as "not connected".
    pub async fn is_connected(&self) -> bool {
        match self.get_block_number().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Connectivity probe to {} failed: {:#}", self.base_url, e);
                false
            }
        }
    }

    /// Lists the accounts managed by the node (eth_accounts).
    pub async fn accounts(&self) -> Result<Vec<String>> {
        self.json_rpc("eth_accounts", vec![]).await
    }

    /// Executes a read-only contract call against the latest block.
    ///
    /// # Arguments
    ///
    /// * `to` - Contract address
    /// * `calldata` - ABI-encoded call (selector + arguments)
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - Raw ABI-encoded return data
    /// * `Err(anyhow::Error)` - RPC failure or revert
    pub async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>> {
        let request = TransactionRequest::new(None, to, calldata);
        let result: String = self
            .json_rpc(
                "eth_call",
                vec![serde_json::to_value(&request)?, serde_json::json!("latest")],
            )
            .await?;
        abi::decode_hex(&result)
    }

    /// Estimates the gas required to execute a transaction.
    pub async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64> {
        let gas_hex: String = self
            .json_rpc("eth_estimateGas", vec![serde_json::to_value(request)?])
            .await?;
        parse_hex_u64(&gas_hex).context("Failed to parse gas estimate")
    }

    /// Submits a transaction signed by the node (eth_sendTransaction).
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Transaction hash as reported by the node
    /// * `Err(anyhow::Error)` - Submission rejected
    pub async fn send_transaction(&self, request: &TransactionRequest) -> Result<String> {
        self.json_rpc("eth_sendTransaction", vec![serde_json::to_value(request)?])
            .await
    }

    /// Queries a transaction receipt.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(receipt))` - Transaction has been mined
    /// * `Ok(None)` - Transaction is pending or unknown
    /// * `Err(anyhow::Error)` - Failed to query receipt
    pub async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>> {
        let hash = if hash.starts_with("0x") {
            hash.to_string()
        } else {
            format!("0x{}", hash)
        };
        self.json_rpc("eth_getTransactionReceipt", vec![serde_json::json!(hash)])
            .await
    }

    /// Polls for a transaction receipt until it is available.
    ///
    /// # Arguments
    ///
    /// * `hash` - Transaction hash
    /// * `timeout` - Total time to wait before giving up
    /// * `poll_interval` - Delay between polls
    pub async fn wait_for_transaction_receipt(
        &self,
        hash: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt> {
        let poll = async {
            loop {
                if let Some(receipt) = self.get_transaction_receipt(hash).await? {
                    return Ok::<_, anyhow::Error>(receipt);
                }
                tokio::time::sleep(poll_interval).await;
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            anyhow::anyhow!(
                "Timed out after {:?} waiting for receipt of transaction {}",
                timeout,
                hash
            )
        })?
    }
}

/// Parses a `0x`-prefixed hex quantity.
fn parse_hex_u64(value: &str) -> Result<u64> {
    u64::from_str_radix(value.strip_prefix("0x").unwrap_or(value), 16)
        .with_context(|| format!("Invalid hex quantity: {}", value))
}

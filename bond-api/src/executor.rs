//! Transaction executor
//!
//! Runs the estimate → submit → confirm sequence shared by every mutating
//! bond endpoint.

use chain_clients_evm::{EvmClient, TransactionReceipt, TransactionRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::contract::BondCall;
use crate::error::TxError;

/// A mined, successful transaction.
#[derive(Debug, Clone)]
pub struct SubmittedTx {
    /// Lowercase `0x`-prefixed transaction hash
    pub tx_hash: String,
    pub receipt: TransactionReceipt,
}

/// Submits bond contract calls from one sender account.
#[derive(Debug, Clone)]
pub struct TransactionExecutor {
    client: Arc<EvmClient>,
    contract_address: String,
    /// Node-managed account; `None` lets the node choose
    sender: Option<String>,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

impl TransactionExecutor {
    pub fn new(
        client: Arc<EvmClient>,
        contract_address: &str,
        sender: Option<String>,
        receipt_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            contract_address: contract_address.to_string(),
            sender,
            receipt_timeout,
            poll_interval,
        }
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Estimates gas, submits the call and waits for its receipt.
    ///
    /// Each step runs only if the previous one succeeded, and the receipt
    /// query is always the last RPC call made.
    ///
    /// # Returns
    ///
    /// * `Ok(SubmittedTx)` - Transaction mined with success status
    /// * `Err(TxError)` - The step that failed, or `Reverted`
    pub async fn submit(&self, call: &BondCall) -> Result<SubmittedTx, TxError> {
        let request = TransactionRequest::new(
            self.sender.as_deref(),
            &self.contract_address,
            &call.calldata(),
        );

        let gas = self.client.estimate_gas(&request).await.map_err(|e| {
            error!("Gas estimation for {} failed: {:#}", call.function_name(), e);
            TxError::EstimationFailed(format!("{:#}", e))
        })?;
        debug!("Estimated {} gas for {}", gas, call.function_name());

        let tx_hash = self
            .client
            .send_transaction(&request.with_gas(gas))
            .await
            .map_err(|e| {
                error!("Submitting {} failed: {:#}", call.function_name(), e);
                TxError::SubmissionFailed(format!("{:#}", e))
            })?;
        let tx_hash = normalize_tx_hash(&tx_hash);
        info!("Submitted {} transaction {}", call.function_name(), tx_hash);

        let receipt = self
            .client
            .wait_for_transaction_receipt(&tx_hash, self.receipt_timeout, self.poll_interval)
            .await
            .map_err(|e| {
                error!("No receipt for {}: {:#}", tx_hash, e);
                TxError::ReceiptUnavailable(format!("{:#}", e))
            })?;

        if !receipt.is_success() {
            error!("Transaction {} reverted (status {:?})", tx_hash, receipt.status);
            return Err(TxError::Reverted { tx_hash });
        }

        Ok(SubmittedTx { tx_hash, receipt })
    }
}

/// Lowercase hex with a `0x` prefix.
pub fn normalize_tx_hash(hash: &str) -> String {
    let trimmed = hash.trim();
    let stripped = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    format!("0x{}", stripped.to_ascii_lowercase())
}

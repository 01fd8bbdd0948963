//! Error types for the bond API
//!
//! Handlers return [`ApiError`] as a warp rejection; the rejection handler in
//! `api::generic` turns it into a `{"error": "..."}` body with the status
//! from [`ApiError::status_code`].

use thiserror::Error;
use warp::http::StatusCode;

/// Failure of the estimate → submit → confirm sequence.
#[derive(Debug, Error)]
pub enum TxError {
    /// eth_estimateGas rejected the call (usually a revert during simulation)
    #[error("gas estimation failed: {0}")]
    EstimationFailed(String),
    /// eth_sendTransaction rejected the transaction
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
    /// No receipt could be obtained (RPC failure or timeout)
    #[error("receipt unavailable: {0}")]
    ReceiptUnavailable(String),
    /// The transaction was mined but execution failed
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No client/contract pair could be established
    #[error("Failed to connect to blockchain or contract")]
    ConnectionUnavailable,

    /// Request rejected before any contract interaction
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Transaction(#[from] TxError),

    /// A view call failed; `what` names the queried data (e.g. "bond info")
    #[error("Failed to retrieve {what} from smart contract: {message}")]
    ContractCall { what: &'static str, message: String },
}

impl ApiError {
    pub fn missing_parameters() -> Self {
        ApiError::Validation("Missing required parameters".to_string())
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ConnectionUnavailable
            | ApiError::Transaction(_)
            | ApiError::ContractCall { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn message(&self) -> String {
        match self {
            ApiError::Transaction(TxError::Reverted { .. }) => {
                "Transaction failed on blockchain".to_string()
            }
            ApiError::Transaction(e) => format!("Smart contract transaction failed: {}", e),
            other => other.to_string(),
        }
    }
}

impl warp::reject::Reject for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::missing_parameters().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::ConnectionUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(TxError::EstimationFailed("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::missing_parameters().message(),
            "Missing required parameters"
        );
        assert_eq!(
            ApiError::from(TxError::Reverted { tx_hash: "0xab".into() }).message(),
            "Transaction failed on blockchain"
        );
        assert_eq!(
            ApiError::from(TxError::SubmissionFailed("nonce too low".into())).message(),
            "Smart contract transaction failed: transaction submission failed: nonce too low"
        );
        assert_eq!(
            ApiError::ContractCall { what: "bond count", message: "boom".into() }.message(),
            "Failed to retrieve bond count from smart contract: boom"
        );
    }
}

//! Bond Trading API Library
//!
//! HTTP façade over an EVM bond contract. Requests are validated, turned into
//! contract calls through [`chain_clients_evm`], and confirmed on chain before
//! a response is returned.

pub mod api;
pub mod config;
pub mod connection;
pub mod contract;
pub mod error;
pub mod executor;

// Re-export commonly used types
pub use config::{ApiConfig, AuthConfig, BlockchainConfig, Config};
pub use connection::{ConnectionHandle, ConnectionManager};
pub use error::{ApiError, TxError};
pub use executor::{SubmittedTx, TransactionExecutor};

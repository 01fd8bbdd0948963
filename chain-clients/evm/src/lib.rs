//! EVM Chain Client Library
//!
//! Shared building blocks for talking to an EVM node over JSON-RPC:
//! - [`EvmClient`]: raw JSON-RPC calls (eth_call, gas estimation, node-signed
//!   transactions, receipt polling)
//! - [`abi`]: Solidity ABI encoding and decoding for the static and dynamic
//!   types the bond contract uses
//! - [`address`]: 20-byte address parsing and EIP-55 checksum encoding

pub mod abi;
pub mod address;
mod client;

pub use client::{EvmClient, EvmLog, TransactionReceipt, TransactionRequest};
pub use ethereum_types::U256;

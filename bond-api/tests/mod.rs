//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    bond_issued_log, build_test_config, build_test_config_without_contract, hex_data,
    mount_rpc_error, mount_rpc_never, mount_rpc_result, receipt_json, rpc_first_params,
    rpc_methods, rpc_requests, setup_mock_node, setup_mock_node_with_call,
    setup_mock_node_with_tx, uint_return, unrelated_log, DUMMY_BUYER_ADDR,
    DUMMY_BUYER_ADDR_CHECKSUM, DUMMY_CONTRACT_ADDR, DUMMY_CONTRACT_ADDR_CHECKSUM, DUMMY_GAS_HEX,
    DUMMY_OWNER_ADDR, DUMMY_OWNER_ADDR_CHECKSUM, DUMMY_SENDER_ADDR, DUMMY_TX_HASH,
    DUMMY_TX_HASH_NORMALIZED, UNREACHABLE_RPC_URL,
};

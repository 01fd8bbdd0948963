//! Shared test helpers for unit tests
//!
//! The module is organized into several categories:
//! - **Constants**: Dummy addresses and hashes
//! - **Configuration Builders**: Test configurations pointing at mock nodes
//! - **Mock Node Setup**: wiremock JSON-RPC responders
//! - **Request Inspection**: Reading back the JSON-RPC calls a mock received
//! - **ABI Fixtures**: Encoded return data and event logs

use bond_api::config::Config;
use chain_clients_evm::abi::{self, AbiValue};
use chain_clients_evm::U256;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy bond contract address (lowercase)
pub const DUMMY_CONTRACT_ADDR: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

/// Checksum form of DUMMY_CONTRACT_ADDR
pub const DUMMY_CONTRACT_ADDR_CHECKSUM: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

/// Dummy node account used as transaction sender
pub const DUMMY_SENDER_ADDR: &str = "0x0000000000000000000000000000000000000011";

/// Dummy buyer / holder address (lowercase)
pub const DUMMY_BUYER_ADDR: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";

/// Checksum form of DUMMY_BUYER_ADDR
pub const DUMMY_BUYER_ADDR_CHECKSUM: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";

/// Dummy owner address configured as sender (lowercase)
#[allow(dead_code)]
pub const DUMMY_OWNER_ADDR: &str = "0xdbf03b407c01e7cd3cbea99509d93f8dddc8c6fb";

/// Checksum form of DUMMY_OWNER_ADDR
#[allow(dead_code)]
pub const DUMMY_OWNER_ADDR_CHECKSUM: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";

/// Transaction hash as the node returns it (mixed case)
pub const DUMMY_TX_HASH: &str =
    "0xABCDEF0000000000000000000000000000000000000000000000000000000012";

/// DUMMY_TX_HASH as the API reports it
#[allow(dead_code)]
pub const DUMMY_TX_HASH_NORMALIZED: &str =
    "0xabcdef0000000000000000000000000000000000000000000000000000000012";

/// Gas estimate returned by the mock node (21000)
pub const DUMMY_GAS_HEX: &str = "0x5208";

/// Endpoint nothing listens on
#[allow(dead_code)]
pub const UNREACHABLE_RPC_URL: &str = "http://127.0.0.1:1";

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Config pointing both endpoints at `rpc_url` with the dummy contract and
/// short timeouts.
pub fn build_test_config(rpc_url: &str) -> Config {
    let mut config = Config::default();
    config.blockchain.rpc_url = rpc_url.to_string();
    config.blockchain.fallback_rpc_url = rpc_url.to_string();
    config.blockchain.contract_address = DUMMY_CONTRACT_ADDR.to_string();
    config.blockchain.connect_timeout_secs = 2;
    config.blockchain.receipt_timeout_secs = 2;
    config.blockchain.receipt_poll_interval_ms = 10;
    config
}

/// Config without a contract address.
#[allow(dead_code)]
pub fn build_test_config_without_contract(rpc_url: &str) -> Config {
    let mut config = build_test_config(rpc_url);
    config.blockchain.contract_address = String::new();
    config
}

// ============================================================================
// MOCK NODE SETUP
// ============================================================================

/// Mount a JSON-RPC mock answering `rpc_method` with `result`
pub async fn mount_rpc_result(server: &MockServer, rpc_method: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": result
        })))
        .mount(server)
        .await;
}

/// Mount a JSON-RPC mock answering `rpc_method` with an error object
#[allow(dead_code)]
pub async fn mount_rpc_error(server: &MockServer, rpc_method: &str, message: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": message }
        })))
        .mount(server)
        .await;
}

/// Mount a mock that must never be hit
#[allow(dead_code)]
pub async fn mount_rpc_never(server: &MockServer, rpc_method: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}

/// Mount the connectivity probe and account listing
pub async fn setup_mock_node(server: &MockServer) {
    mount_rpc_result(server, "eth_blockNumber", json!("0x10")).await;
    mount_rpc_result(server, "eth_accounts", json!([DUMMY_SENDER_ADDR])).await;
}

/// Transaction receipt JSON with the given status and logs
pub fn receipt_json(status: &str, logs: Vec<Value>) -> Value {
    json!({
        "transactionHash": DUMMY_TX_HASH.to_lowercase(),
        "status": status,
        "blockNumber": "0x11",
        "gasUsed": DUMMY_GAS_HEX,
        "logs": logs
    })
}

/// Mount a node that accepts transactions and mines them with `status`
#[allow(dead_code)]
pub async fn setup_mock_node_with_tx(server: &MockServer, status: &str, logs: Vec<Value>) {
    setup_mock_node(server).await;
    mount_rpc_result(server, "eth_estimateGas", json!(DUMMY_GAS_HEX)).await;
    mount_rpc_result(server, "eth_sendTransaction", json!(DUMMY_TX_HASH)).await;
    mount_rpc_result(server, "eth_getTransactionReceipt", receipt_json(status, logs)).await;
}

/// Mount a node whose eth_call returns `data`
#[allow(dead_code)]
pub async fn setup_mock_node_with_call(server: &MockServer, data: &[u8]) {
    setup_mock_node(server).await;
    mount_rpc_result(server, "eth_call", json!(format!("0x{}", hex::encode(data)))).await;
}

// ============================================================================
// REQUEST INSPECTION
// ============================================================================

/// JSON-RPC request bodies received by the mock, in order
pub async fn rpc_requests(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|req| serde_json::from_slice::<Value>(&req.body).ok())
        .collect()
}

/// JSON-RPC method names received by the mock, in order
#[allow(dead_code)]
pub async fn rpc_methods(server: &MockServer) -> Vec<String> {
    rpc_requests(server)
        .await
        .iter()
        .filter_map(|body| body["method"].as_str().map(str::to_string))
        .collect()
}

/// First params entry of every request with `rpc_method`
#[allow(dead_code)]
pub async fn rpc_first_params(server: &MockServer, rpc_method: &str) -> Vec<Value> {
    rpc_requests(server)
        .await
        .into_iter()
        .filter(|body| body["method"] == rpc_method)
        .map(|body| body["params"][0].clone())
        .collect()
}

// ============================================================================
// ABI FIXTURES
// ============================================================================

/// `0x`-prefixed hex of `bytes`
pub fn hex_data(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encoded single uint256 return value
#[allow(dead_code)]
pub fn uint_return(value: u64) -> Vec<u8> {
    abi::uint_word(U256::from(value)).to_vec()
}

/// `BondIssued` log with the given bond id
#[allow(dead_code)]
pub fn bond_issued_log(bond_id: u64) -> Value {
    let data = abi::encode_args(&[
        AbiValue::Uint(U256::from(bond_id)),
        AbiValue::String("Green Bond".to_string()),
        AbiValue::String("City of Springfield".to_string()),
        AbiValue::Uint(U256::from(1000)),
    ]);
    json!({
        "address": DUMMY_CONTRACT_ADDR,
        "topics": [abi::event_topic("BondIssued(uint256,string,string,uint256)")],
        "data": hex_data(&data),
        "logIndex": "0x0"
    })
}

/// A log from an unrelated event
#[allow(dead_code)]
pub fn unrelated_log() -> Value {
    json!({
        "address": DUMMY_CONTRACT_ADDR,
        "topics": [abi::event_topic("Transfer(address,address,uint256)")],
        "data": hex_data(&abi::uint_word(U256::from(1))),
        "logIndex": "0x0"
    })
}

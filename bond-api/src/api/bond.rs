//! Bond endpoint handlers
//!
//! Mutating endpoints (issue, purchase, sell, redeem) go through the
//! [`TransactionExecutor`](crate::executor::TransactionExecutor); view
//! endpoints call the contract directly. Every handler checks the blockchain
//! connection before looking at its input.

use chain_clients_evm::address::{checksum_encode, parse_address};
use chain_clients_evm::U256;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, info};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::{Rejection, Reply};

use crate::connection::{ConnectionHandle, ConnectionManager};
use crate::contract::{find_bond_issued, BondCall, BondPurchasedEvent, BondSoldEvent};
use crate::error::ApiError;

/// bondId reported when the receipt has no decodable `BondIssued` event
pub const UNKNOWN_BOND_ID: &str = "Unknown";

// ============================================================================
// REQUEST PARSING HELPERS
// ============================================================================

/// Parses the request body as a JSON object.
pub fn parse_body(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Validation(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(ApiError::Validation(format!("Invalid JSON: {}", e))),
    }
}

/// Returns the field if it is present and not null.
fn present<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|v| !v.is_null())
}

/// Returns the field if it is a non-empty string (other present values count
/// as present too and fail type checks later).
fn present_text<'a>(body: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    present(body, field).filter(|v| v.as_str().map_or(true, |s| !s.is_empty()))
}

/// Converts a JSON integer or decimal string into a `uint256`.
///
/// JSON numbers keep their literal text, so integers wider than 64 bits are
/// accepted. Negatives, fractions and exponents are rejected.
pub fn parse_uint(value: &Value, field: &str) -> Result<U256, ApiError> {
    let invalid = || ApiError::Validation(format!("Invalid value for {}: {}", field, value));
    let digits = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(invalid()),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    U256::from_dec_str(&digits).map_err(|_| invalid())
}

fn parse_text(value: &Value, field: &str) -> Result<String, ApiError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("Invalid value for {}: {}", field, value)))
}

/// Plain JSON integer of any width.
pub fn uint_json(value: U256) -> Value {
    let digits = value.to_string();
    serde_json::from_str(&digits).unwrap_or(Value::String(digits))
}

async fn require_connection(
    connections: &ConnectionManager,
    endpoint: &str,
) -> Result<ConnectionHandle, ApiError> {
    connections.ensure_connected().await.ok_or_else(|| {
        error!("Failed to connect to blockchain or contract for {}", endpoint);
        ApiError::ConnectionUnavailable
    })
}

fn reject(endpoint: &str, err: ApiError) -> Rejection {
    error!("{} failed: {}", endpoint, err.message());
    warp::reject::custom(err)
}

// ============================================================================
// MUTATING ENDPOINTS
// ============================================================================

/// POST /bond/issue
pub async fn issue_bond_handler(
    body: Bytes,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Issue bond endpoint called");
    let response = issue_bond(&body, &connections)
        .await
        .map_err(|e| reject("issue bond", e))?;
    Ok(warp::reply::with_status(
        warp::reply::json(&response),
        StatusCode::CREATED,
    ))
}

async fn issue_bond(body: &[u8], connections: &ConnectionManager) -> Result<Value, ApiError> {
    let handle = require_connection(connections, "issue bond").await?;
    let body = parse_body(body)?;
    debug!("Issue bond data received: {:?}", body);

    let (
        Some(name),
        Some(issuer),
        Some(face_value),
        Some(maturity_date),
        Some(interest_rate),
        Some(supply),
    ) = (
        present_text(&body, "name"),
        present_text(&body, "issuer"),
        present(&body, "faceValue"),
        present(&body, "maturityDate"),
        present(&body, "interestRate"),
        present(&body, "supply"),
    )
    else {
        return Err(ApiError::missing_parameters());
    };

    let call = BondCall::Issue {
        name: parse_text(name, "name")?,
        issuer: parse_text(issuer, "issuer")?,
        face_value: parse_uint(face_value, "faceValue")?,
        maturity_date: parse_uint(maturity_date, "maturityDate")?,
        interest_rate: parse_uint(interest_rate, "interestRate")?,
        supply: parse_uint(supply, "supply")?,
    };

    let tx = handle.executor.submit(&call).await?;

    let bond_id = match find_bond_issued(&tx.receipt.logs) {
        Some(event) => {
            debug!("BondIssued event: {:?}", event);
            uint_json(event.bond_id)
        }
        None => json!(UNKNOWN_BOND_ID),
    };

    Ok(json!({
        "message": "Bond issued successfully",
        "tx_hash": tx.tx_hash,
        "bondId": bond_id
    }))
}

/// POST /bond/purchase
pub async fn purchase_bond_handler(
    body: Bytes,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Purchase bond endpoint called");
    let response = purchase_bond(&body, &connections)
        .await
        .map_err(|e| reject("purchase bond", e))?;
    Ok(warp::reply::json(&response))
}

async fn purchase_bond(body: &[u8], connections: &ConnectionManager) -> Result<Value, ApiError> {
    let handle = require_connection(connections, "purchase bond").await?;
    let body = parse_body(body)?;
    debug!("Purchase bond data received: {:?}", body);

    let (Some(bond_id), Some(amount)) = (present(&body, "bondId"), present(&body, "amount")) else {
        return Err(ApiError::missing_parameters());
    };
    let bond_id = parse_uint(bond_id, "bondId")?;
    let amount = parse_uint(amount, "amount")?;

    let tx = handle
        .executor
        .submit(&BondCall::Purchase { bond_id, amount })
        .await?;

    for event in tx.receipt.logs.iter().filter_map(|log| BondPurchasedEvent::decode(log).ok()) {
        debug!("BondPurchased event: {:?}", event);
    }

    Ok(json!({
        "message": "Bond purchased successfully",
        "tx_hash": tx.tx_hash,
        "bondId": uint_json(bond_id),
        "amount": uint_json(amount)
    }))
}

/// POST /bond/sell
pub async fn sell_bond_handler(
    body: Bytes,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Sell bond endpoint called");
    let response = sell_bond(&body, &connections)
        .await
        .map_err(|e| reject("sell bond", e))?;
    Ok(warp::reply::json(&response))
}

async fn sell_bond(body: &[u8], connections: &ConnectionManager) -> Result<Value, ApiError> {
    let handle = require_connection(connections, "sell bond").await?;
    let body = parse_body(body)?;
    debug!("Sell bond data received: {:?}", body);

    let (Some(bond_id), Some(amount), Some(buyer)) = (
        present(&body, "bondId"),
        present(&body, "amount"),
        present_text(&body, "buyerAddress"),
    ) else {
        return Err(ApiError::missing_parameters());
    };
    let bond_id = parse_uint(bond_id, "bondId")?;
    let amount = parse_uint(amount, "amount")?;
    let buyer = buyer
        .as_str()
        .and_then(|s| parse_address(s).ok())
        .ok_or_else(|| ApiError::Validation("Invalid buyer address format".to_string()))?;

    let tx = handle
        .executor
        .submit(&BondCall::Sell {
            bond_id,
            amount,
            buyer,
        })
        .await?;

    for event in tx.receipt.logs.iter().filter_map(|log| BondSoldEvent::decode(log).ok()) {
        debug!("BondSold event: {:?}", event);
    }

    Ok(json!({
        "message": "Bond sold successfully",
        "tx_hash": tx.tx_hash,
        "bondId": uint_json(bond_id),
        "amount": uint_json(amount),
        "buyerAddress": checksum_encode(&buyer)
    }))
}

/// POST /bond/redeem
pub async fn redeem_bond_handler(
    body: Bytes,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Redeem bond endpoint called");
    let response = redeem_bond(&body, &connections)
        .await
        .map_err(|e| reject("redeem bond", e))?;
    Ok(warp::reply::json(&response))
}

async fn redeem_bond(body: &[u8], connections: &ConnectionManager) -> Result<Value, ApiError> {
    let handle = require_connection(connections, "redeem bond").await?;
    let body = parse_body(body)?;
    debug!("Redeem bond data received: {:?}", body);

    let (Some(bond_id), Some(amount)) = (present(&body, "bondId"), present(&body, "amount")) else {
        return Err(ApiError::missing_parameters());
    };
    let bond_id = parse_uint(bond_id, "bondId")?;
    let amount = parse_uint(amount, "amount")?;

    let tx = handle
        .executor
        .submit(&BondCall::Redeem { bond_id, amount })
        .await?;

    Ok(json!({
        "message": "Bond redeemed successfully",
        "tx_hash": tx.tx_hash,
        "bondId": uint_json(bond_id),
        "amount": uint_json(amount)
    }))
}

// ============================================================================
// VIEW ENDPOINTS
// ============================================================================

/// GET /bond/:id/info
pub async fn bond_info_handler(
    bond_id: u64,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Get bond info endpoint called for bond {}", bond_id);
    let handle = require_connection(&connections, "get bond info")
        .await
        .map_err(|e| reject("get bond info", e))?;

    let info = handle
        .contract
        .get_bond_info(U256::from(bond_id))
        .await
        .map_err(|e| {
            reject(
                "get bond info",
                ApiError::ContractCall {
                    what: "bond info",
                    message: format!("{:#}", e),
                },
            )
        })?;
    debug!("Retrieved bond info for bond {}", bond_id);

    Ok(warp::reply::json(&json!({
        "bondId": bond_id,
        "name": info.name,
        "issuer": info.issuer,
        "faceValue": uint_json(info.face_value),
        "maturityDate": uint_json(info.maturity_date),
        "interestRate": uint_json(info.interest_rate),
        "totalSupply": uint_json(info.total_supply),
        "isActive": info.is_active
    })))
}

/// GET /bond/:id/holders
pub async fn bond_holders_handler(
    bond_id: u64,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Get bond holders endpoint called for bond {}", bond_id);
    let handle = require_connection(&connections, "get bond holders")
        .await
        .map_err(|e| reject("get bond holders", e))?;

    let holders = handle
        .contract
        .get_bond_holders(U256::from(bond_id))
        .await
        .map_err(|e| {
            reject(
                "get bond holders",
                ApiError::ContractCall {
                    what: "bond holders",
                    message: format!("{:#}", e),
                },
            )
        })?;
    debug!("Retrieved {} holders for bond {}", holders.len(), bond_id);

    Ok(warp::reply::json(&json!({
        "bondId": bond_id,
        "holders": holders
    })))
}

/// GET /bond/:id/holder/:address/amount
pub async fn bond_holder_amount_handler(
    bond_id: u64,
    holder_address: String,
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!(
        "Get bond holder amount endpoint called for bond {}, holder {}",
        bond_id, holder_address
    );
    let handle = require_connection(&connections, "get bond holder amount")
        .await
        .map_err(|e| reject("get bond holder amount", e))?;

    let holder = parse_address(&holder_address).map_err(|_| {
        reject(
            "get bond holder amount",
            ApiError::Validation("Invalid holder address format".to_string()),
        )
    })?;
    let holder_checksum = checksum_encode(&holder);

    let amount = handle
        .contract
        .get_bond_holder_amount(U256::from(bond_id), holder)
        .await
        .map_err(|e| {
            reject(
                "get bond holder amount",
                ApiError::ContractCall {
                    what: "bond holder amount",
                    message: format!("{:#}", e),
                },
            )
        })?;
    debug!(
        "Retrieved bond holder amount for bond {}, holder {}: {}",
        bond_id, holder_checksum, amount
    );

    Ok(warp::reply::json(&json!({
        "bondId": bond_id,
        "holderAddress": holder_checksum,
        "amount": uint_json(amount)
    })))
}

/// GET /bond/count
pub async fn bond_count_handler(connections: Arc<ConnectionManager>) -> Result<impl Reply, Rejection> {
    info!("Get bond count endpoint called");
    let handle = require_connection(&connections, "get bond count")
        .await
        .map_err(|e| reject("get bond count", e))?;

    let count = handle.contract.bond_count().await.map_err(|e| {
        reject(
            "get bond count",
            ApiError::ContractCall {
                what: "bond count",
                message: format!("{:#}", e),
            },
        )
    })?;
    debug!("Retrieved bond count: {}", count);

    Ok(warp::reply::json(&json!({ "bondCount": uint_json(count) })))
}

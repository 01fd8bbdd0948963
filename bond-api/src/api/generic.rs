//! Generic API structures and handlers
//!
//! This module contains the shared error envelope, the service-level handlers
//! (health, status, contract address), warp filter helpers, and the
//! [`ApiServer`] that wires every route together.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use warp::{
    http::{Method, StatusCode},
    Filter, Rejection, Reply,
};

use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::error::ApiError;

/// Value reported for the contract address when none is configured
pub const NOT_CONFIGURED: &str = "Not configured";

/// Routes listed by `/status`
pub const ENDPOINTS: [&str; 11] = [
    "/health",
    "/status",
    "/contract/address",
    "/bond/issue",
    "/bond/purchase",
    "/bond/sell",
    "/bond/redeem",
    "/bond/count",
    "/bond/<bond_id>/info",
    "/bond/<bond_id>/holders",
    "/bond/<bond_id>/holder/<holder_address>/amount",
];

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Body of every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response of `/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub blockchain_connected: bool,
    pub contract_deployed: bool,
    pub contract_address: String,
    pub endpoints: Vec<String>,
}

// ============================================================================
// GENERIC API HANDLERS
// ============================================================================

/// Handler for the health endpoint. Never touches the blockchain.
pub async fn health_handler() -> Result<impl Reply, Rejection> {
    info!("Health check endpoint called");
    Ok(warp::reply::json(&serde_json::json!({ "status": "healthy" })))
}

/// Handler for the contract address endpoint.
pub async fn contract_address_handler(
    connections: Arc<ConnectionManager>,
) -> Result<impl Reply, Rejection> {
    info!("Contract address endpoint called");
    let address = connections
        .config()
        .blockchain
        .contract_address()
        .unwrap_or(NOT_CONFIGURED)
        .to_string();
    Ok(warp::reply::json(&serde_json::json!({ "contract_address": address })))
}

/// Handler for the status endpoint.
///
/// Runs the connection check first so the reported state is current.
pub async fn status_handler(connections: Arc<ConnectionManager>) -> Result<impl Reply, Rejection> {
    info!("Status endpoint called");
    connections.ensure_connected().await;
    let (blockchain_connected, contract_deployed) = connections.status().await;
    debug!(
        "Status: blockchain_connected={}, contract_deployed={}",
        blockchain_connected, contract_deployed
    );

    Ok(warp::reply::json(&StatusResponse {
        status: "API is running".to_string(),
        blockchain_connected,
        contract_deployed,
        contract_address: connections
            .config()
            .blockchain
            .contract_address()
            .unwrap_or(NOT_CONFIGURED)
            .to_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    }))
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Creates a warp filter that injects the connection manager into handlers.
pub fn with_connections(
    connections: Arc<ConnectionManager>,
) -> impl Filter<Extract = (Arc<ConnectionManager>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || connections.clone())
}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::POST, Method::OPTIONS];

    if allowed_origins.iter().any(|origin| origin == "*") {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(vec!["content-type", "authorization"])
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(vec!["content-type", "authorization"])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
///
/// Converts every rejection into `{"error": "..."}` with a matching status.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<ApiError>() {
        (err.status_code(), err.message())
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server for the bond contract.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Shared blockchain connection
    connections: Arc<ConnectionManager>,
}

impl ApiServer {
    /// Creates a new API server with its own connection manager.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let connections = Arc::new(ConnectionManager::new(config.clone()));
        Self {
            config,
            connections,
        }
    }

    /// Creates an API server around an existing connection manager.
    pub fn with_connections(connections: Arc<ConnectionManager>) -> Self {
        Self {
            config: Arc::new(connections.config().clone()),
            connections,
        }
    }

    /// Starts the API server and begins handling HTTP requests.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Server ran until shutdown
    /// * `Err(anyhow::Error)` - Invalid bind address
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.config.api.host, self.config.api.port
        );

        let routes = self.create_routes();

        let addr: std::net::SocketAddr =
            format!("{}:{}", self.config.api.host, self.config.api.port)
                .parse()
                .context("Failed to parse API server address")?;

        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        use super::{bond, docs};

        let connections = self.connections.clone();

        let health = warp::path("health")
            .and(warp::path::end())
            .and(warp::get())
            .and_then(health_handler);

        let status = warp::path("status")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_connections(connections.clone()))
            .and_then(status_handler);

        let contract_address = warp::path!("contract" / "address")
            .and(warp::get())
            .and(with_connections(connections.clone()))
            .and_then(contract_address_handler);

        // POST /bond/issue
        let issue = warp::path!("bond" / "issue")
            .and(warp::post())
            .and(warp::body::bytes())
            .and(with_connections(connections.clone()))
            .and_then(bond::issue_bond_handler);

        // POST /bond/purchase
        let purchase = warp::path!("bond" / "purchase")
            .and(warp::post())
            .and(warp::body::bytes())
            .and(with_connections(connections.clone()))
            .and_then(bond::purchase_bond_handler);

        // POST /bond/sell
        let sell = warp::path!("bond" / "sell")
            .and(warp::post())
            .and(warp::body::bytes())
            .and(with_connections(connections.clone()))
            .and_then(bond::sell_bond_handler);

        // POST /bond/redeem
        let redeem = warp::path!("bond" / "redeem")
            .and(warp::post())
            .and(warp::body::bytes())
            .and(with_connections(connections.clone()))
            .and_then(bond::redeem_bond_handler);

        // GET /bond/count (before the id routes; "count" is not an id)
        let count = warp::path!("bond" / "count")
            .and(warp::get())
            .and(with_connections(connections.clone()))
            .and_then(bond::bond_count_handler);

        // GET /bond/:id/info
        let info = warp::path!("bond" / u64 / "info")
            .and(warp::get())
            .and(with_connections(connections.clone()))
            .and_then(bond::bond_info_handler);

        // GET /bond/:id/holders
        let holders = warp::path!("bond" / u64 / "holders")
            .and(warp::get())
            .and(with_connections(connections.clone()))
            .and_then(bond::bond_holders_handler);

        // GET /bond/:id/holder/:address/amount
        let holder_amount = warp::path!("bond" / u64 / "holder" / String / "amount")
            .and(warp::get())
            .and(with_connections(connections))
            .and_then(bond::bond_holder_amount_handler);

        let openapi = warp::path("openapi.yaml")
            .and(warp::path::end())
            .and(warp::get())
            .map(docs::openapi_reply);

        let swagger = warp::path("docs")
            .and(warp::path::end())
            .and(warp::get())
            .map(docs::swagger_ui_reply);

        health
            .or(status)
            .or(contract_address)
            .or(issue)
            .or(purchase)
            .or(sell)
            .or(redeem)
            .or(count)
            .or(info)
            .or(holders)
            .or(holder_amount)
            .or(openapi)
            .or(swagger)
            .with(create_cors_filter(&self.config.api.cors_origins))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}

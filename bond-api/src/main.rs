//! Bond Trading API Service
//!
//! HTTP service that issues, trades and queries bonds on an EVM bond
//! contract. Transactions are signed by the node's unlocked sender account.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use bond_api::api::ApiServer;
use bond_api::config::{Config, CONFIG_PATH_ENV};
use bond_api::connection::ConnectionManager;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point.
///
/// 1. Initializes logging
/// 2. Loads configuration
/// 3. Optionally connects to the blockchain up front
/// 4. Runs the API server until shutdown
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("Bond Trading API");
        println!();
        println!("Usage: bond-api [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --config <path>   Use custom config file path");
        println!("  --help, -h        Show this help message");
        println!();
        println!("Environment variables:");
        println!("  BOND_API_CONFIG_PATH   Path to config file (default config/bond_api.toml)");
        println!("  BOND_API_<SECTION>__<KEY>   Override a config value (e.g. BOND_API_API__PORT)");
        println!("  WEB3_PROVIDER          Primary JSON-RPC endpoint");
        println!("  CONTRACT_ADDRESS       Bond contract address");
        println!("  OWNER_ADDRESS          Transaction sender account");
        println!("  AUTH_TOKEN             Bearer token (reserved)");
        return Ok(());
    }

    info!("Starting Bond Trading API");

    if let Some(i) = args.iter().position(|arg| arg == "--config") {
        match args.get(i + 1) {
            Some(path) => {
                std::env::set_var(CONFIG_PATH_ENV, path);
                info!("Using custom config: {}", path);
            }
            None => anyhow::bail!("--config requires a path"),
        }
    }

    let config = Config::load()?;
    info!("Configuration loaded successfully");

    if config.blockchain.contract_address().is_none() {
        warn!("No contract address configured; bond endpoints will return errors");
    }

    let connections = Arc::new(ConnectionManager::new(Arc::new(config.clone())));
    if config.blockchain.eager_connect {
        info!("Connecting to blockchain at startup");
        if connections.ensure_connected().await.is_none() {
            warn!("Initial blockchain connection failed; will retry on first request");
        }
    }

    let api_server = ApiServer::with_connections(connections);
    api_server.run().await?;

    Ok(())
}

//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the bond API.
//! Configuration includes the blockchain endpoints, the bond contract address,
//! transaction timing settings and API server settings.
//!
//! Sources, lowest precedence first:
//! 1. TOML file at `BOND_API_CONFIG_PATH` (default `config/bond_api.toml`), optional
//! 2. `BOND_API_*` environment variables, `__` separating nested keys
//!    (e.g. `BOND_API_API__PORT=5000`)
//! 3. `WEB3_PROVIDER`, `CONTRACT_ADDRESS`, `AUTH_TOKEN` and `OWNER_ADDRESS`

use anyhow::Context;
use chain_clients_evm::address::parse_address;
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Environment variable holding the config file path
pub const CONFIG_PATH_ENV: &str = "BOND_API_CONFIG_PATH";

/// Config file used when `BOND_API_CONFIG_PATH` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/bond_api.toml";

/// Local development node, also used as the fallback endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Legacy variables and the keys they override
const LEGACY_ENV_OVERRIDES: [(&str, &str); 4] = [
    ("WEB3_PROVIDER", "blockchain.rpc_url"),
    ("CONTRACT_ADDRESS", "blockchain.contract_address"),
    ("AUTH_TOKEN", "auth.token"),
    ("OWNER_ADDRESS", "blockchain.owner_address"),
];

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Blockchain connection and contract settings
    #[serde(default)]
    pub blockchain: BlockchainConfig,
    /// API server configuration (host, port, CORS settings)
    #[serde(default)]
    pub api: ApiConfig,
    /// Authentication settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Connection details for the EVM node and the bond contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainConfig {
    /// Primary JSON-RPC endpoint
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Endpoint tried when the primary one is unreachable
    #[serde(default = "default_rpc_url")]
    pub fallback_rpc_url: String,
    /// Bond contract address; empty means not configured
    #[serde(default)]
    pub contract_address: String,
    /// Sender for transactions; empty means use the node's first account
    #[serde(default)]
    pub owner_address: String,
    /// HTTP timeout for every JSON-RPC request, connection probe included
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// How long to wait for a transaction receipt
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,
    /// Delay between receipt polls
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// Connect at startup instead of on the first request
    #[serde(default)]
    pub eager_connect: bool,
}

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to bind the API server to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Bearer token settings.
///
/// The token is loaded but no route checks it yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_token")]
    pub token: String,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_receipt_timeout_secs() -> u64 {
    120
}

fn default_receipt_poll_interval_ms() -> u64 {
    100
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_auth_token() -> String {
    "default-token".to_string()
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            fallback_rpc_url: default_rpc_url(),
            contract_address: String::new(),
            owner_address: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            receipt_timeout_secs: default_receipt_timeout_secs(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            eager_connect: false,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: default_auth_token(),
        }
    }
}

impl BlockchainConfig {
    /// Returns the contract address, or `None` when it is not configured.
    pub fn contract_address(&self) -> Option<&str> {
        let address = self.contract_address.trim();
        (!address.is_empty()).then_some(address)
    }

    /// Returns the configured sender, or `None` when it should come from the node.
    pub fn owner_address(&self) -> Option<&str> {
        let address = self.owner_address.trim();
        (!address.is_empty()).then_some(address)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Validates address formats and the API port.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - An address is malformed or the port is zero
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(address) = self.blockchain.contract_address() {
            parse_address(address).with_context(|| {
                format!("Configuration error: invalid contract_address '{}'", address)
            })?;
        }

        if let Some(address) = self.blockchain.owner_address() {
            parse_address(address).with_context(|| {
                format!("Configuration error: invalid owner_address '{}'", address)
            })?;
        }

        if self.api.port == 0 {
            anyhow::bail!("Configuration error: api.port must not be 0");
        }

        Ok(())
    }

    /// Loads configuration from the file named by `BOND_API_CONFIG_PATH`
    /// (or `config/bond_api.toml`) layered with the process environment.
    ///
    /// A missing file is not an error; every field has a default.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - Unparseable file, bad value, or validation failure
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    /// Loads configuration from `path` layered with the process environment.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        Self::load_with_env(path, std::env::vars().collect())
    }

    /// Loads configuration from `path` layered with the given environment map.
    ///
    /// # Arguments
    ///
    /// * `path` - TOML file; skipped when it does not exist
    /// * `env` - Environment variables to apply on top of the file
    pub fn load_with_env(path: &str, env: HashMap<String, String>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("BOND_API")
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(env.clone())),
            );

        for (var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder
                .set_override_option(key, env.get(var).cloned())
                .with_context(|| format!("Failed to apply {}", var))?;
        }

        let config: Config = builder
            .build()
            .with_context(|| format!("Failed to read configuration from '{}'", path))?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config.validate()?;
        Ok(config)
    }
}

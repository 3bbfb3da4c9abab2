//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the off-chain clients.
//! Configuration includes the Cardano network, the Blockfrost endpoint, the validator
//! blueprint location and transaction settings. Secrets (API key, signing key) are
//! never stored in the file; the file only names the environment variables holding them.

use serde::{Deserialize, Serialize};

use crate::error::OffchainError;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/offchain.toml";

/// Environment variable overriding the configuration file location
pub const CONFIG_PATH_ENV: &str = "OFFCHAIN_CONFIG_PATH";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OffchainConfig {
    /// Network and indexer settings
    #[serde(default)]
    pub network: NetworkConfig,
    /// Compiled validator artifact
    #[serde(default)]
    pub blueprint: BlueprintConfig,
    /// Transaction building settings
    #[serde(default)]
    pub transaction: TransactionConfig,
    /// Wallet key sources
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Cardano network the clients talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Preprod,
    Preview,
}

impl Network {
    /// Default Blockfrost endpoint for the network
    pub fn blockfrost_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://cardano-mainnet.blockfrost.io/api/v0",
            Network::Preprod => "https://cardano-preprod.blockfrost.io/api/v0",
            Network::Preview => "https://cardano-preview.blockfrost.io/api/v0",
        }
    }

    /// Network discriminant written into address headers
    pub fn address_network(&self) -> pallas_addresses::Network {
        match self {
            Network::Mainnet => pallas_addresses::Network::Mainnet,
            Network::Preprod | Network::Preview => pallas_addresses::Network::Testnet,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Preprod => "preprod",
            Network::Preview => "preview",
        }
    }
}

/// Network and indexer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Cardano network
    #[serde(default = "default_network")]
    pub name: Network,
    /// Blockfrost base URL override (defaults to the network's public endpoint)
    #[serde(default)]
    pub blockfrost_url: Option<String>,
    /// Environment variable name containing the Blockfrost project id
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: default_network(),
            blockfrost_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl NetworkConfig {
    /// Effective Blockfrost base URL without trailing slash
    pub fn base_url(&self) -> String {
        self.blockfrost_url
            .as_deref()
            .unwrap_or_else(|| self.name.blockfrost_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Reads the Blockfrost project id from the configured environment variable.
    pub fn api_key(&self) -> Result<String, OffchainError> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| OffchainError::MissingEnv(self.api_key_env.clone()))
    }
}

/// Validator blueprint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueprintConfig {
    /// Path to the Aiken `plutus.json`
    #[serde(default = "default_blueprint_path")]
    pub path: String,
    /// Title substring identifying the escrow validator
    #[serde(default = "default_escrow_validator")]
    pub escrow_validator: String,
    /// Title substring identifying the hello-world validator
    #[serde(default = "default_hello_world_validator")]
    pub hello_world_validator: String,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            path: default_blueprint_path(),
            escrow_validator: default_escrow_validator(),
            hello_world_validator: default_hello_world_validator(),
        }
    }
}

/// Transaction building configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionConfig {
    /// Width of the validity interval for script spends, in seconds (one slot per second)
    #[serde(default = "default_validity_window_secs")]
    pub validity_window_secs: u64,
    /// Minimum lovelace of the UTxO used as collateral
    #[serde(default = "default_collateral_lovelace")]
    pub collateral_lovelace: u64,
    /// Minimum lovelace left in the change output
    #[serde(default = "default_min_change_lovelace")]
    pub min_change_lovelace: u64,
    /// Seconds the example workflow waits for the lock transaction to settle
    #[serde(default = "default_confirmation_wait_secs")]
    pub confirmation_wait_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            validity_window_secs: default_validity_window_secs(),
            collateral_lovelace: default_collateral_lovelace(),
            min_change_lovelace: default_min_change_lovelace(),
            confirmation_wait_secs: default_confirmation_wait_secs(),
        }
    }
}

/// Wallet key source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Environment variable name containing the signing key (hex or cborHex)
    #[serde(default = "default_signing_key_env")]
    pub signing_key_env: String,
    /// Environment variable name containing the path to a cardano-cli `.skey` file
    #[serde(default = "default_signing_key_file_env")]
    pub signing_key_file_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            signing_key_env: default_signing_key_env(),
            signing_key_file_env: default_signing_key_file_env(),
        }
    }
}

fn default_network() -> Network {
    Network::Preprod
}

fn default_api_key_env() -> String {
    "BLOCKFROST_API_KEY".to_string()
}

fn default_blueprint_path() -> String {
    "plutus.json".to_string()
}

fn default_escrow_validator() -> String {
    "escrow".to_string()
}

fn default_hello_world_validator() -> String {
    "hello_world".to_string()
}

fn default_validity_window_secs() -> u64 {
    900
}

fn default_collateral_lovelace() -> u64 {
    5_000_000
}

fn default_min_change_lovelace() -> u64 {
    1_000_000
}

fn default_confirmation_wait_secs() -> u64 {
    30
}

fn default_signing_key_env() -> String {
    "CARDANO_SIGNING_KEY".to_string()
}

fn default_signing_key_file_env() -> String {
    "CARDANO_SIGNING_KEY_FILE".to_string()
}

impl OffchainConfig {
    /// Loads configuration from a TOML file.
    ///
    /// This function:
    /// 1. Uses the provided path, or OFFCHAIN_CONFIG_PATH, or config/offchain.toml
    /// 2. If the file exists, parses and validates it
    /// 3. If an explicitly requested file is missing, returns an error
    /// 4. If the default file is missing, falls back to built-in defaults
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file
    ///
    /// # Returns
    ///
    /// * `Ok(OffchainConfig)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - File missing, unparsable or invalid
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let requested = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok());
        let explicit = requested.is_some();
        let config_path = requested.unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: OffchainConfig = toml::from_str(&content).map_err(|e| {
                anyhow::anyhow!("Failed to parse configuration file '{}': {}", config_path, e)
            })?;
            config.validate()?;
            Ok(config)
        } else if explicit {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/offchain.template.toml config/offchain.toml\n\
                Then edit config/offchain.toml with your actual values.",
                config_path
            ))
        } else {
            let config = OffchainConfig::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Loads configuration (convenience method that uses the default path).
    ///
    /// This is equivalent to calling `load_from_path(None)`.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency.
    ///
    /// Checks:
    /// - Blockfrost URL override is an http(s) URL
    /// - Environment variable names are non-empty
    /// - Validator titles are non-empty
    /// - Validity window is positive
    /// - Collateral and change minimums are at least 1 ADA
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = &self.network.blockfrost_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!(
                    "Configuration error: blockfrost_url must be an http(s) URL, got '{}'",
                    url
                );
            }
        }

        if self.network.api_key_env.trim().is_empty() {
            anyhow::bail!("Configuration error: network.api_key_env must not be empty");
        }
        if self.wallet.signing_key_env.trim().is_empty()
            || self.wallet.signing_key_file_env.trim().is_empty()
        {
            anyhow::bail!(
                "Configuration error: wallet environment variable names must not be empty"
            );
        }

        if self.blueprint.escrow_validator.trim().is_empty()
            || self.blueprint.hello_world_validator.trim().is_empty()
        {
            anyhow::bail!("Configuration error: validator titles must not be empty");
        }

        if self.transaction.validity_window_secs == 0 {
            anyhow::bail!("Configuration error: validity_window_secs must be positive");
        }
        if self.transaction.collateral_lovelace < 1_000_000 {
            anyhow::bail!(
                "Configuration error: collateral_lovelace must be at least 1000000, got {}",
                self.transaction.collateral_lovelace
            );
        }
        if self.transaction.min_change_lovelace < 1_000_000 {
            anyhow::bail!(
                "Configuration error: min_change_lovelace must be at least 1000000, got {}",
                self.transaction.min_change_lovelace
            );
        }

        Ok(())
    }
}

//! Unit tests for configuration module

use cardano_offchain::{
    config::{NetworkConfig, OffchainConfig},
    Network, OffchainError,
};
use std::io::Write;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Write a TOML configuration to a temporary file
fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ============================================================================
// LOADING TESTS
// ============================================================================

/// What is tested: defaults match the documented values
/// Why: a missing default config file falls back to these
#[test]
fn test_default_config() {
    let config = OffchainConfig::default();
    assert_eq!(config.network.name, Network::Preprod);
    assert_eq!(config.network.api_key_env, "BLOCKFROST_API_KEY");
    assert_eq!(config.blueprint.path, "plutus.json");
    assert_eq!(config.blueprint.escrow_validator, "escrow");
    assert_eq!(config.transaction.validity_window_secs, 900);
    assert_eq!(config.transaction.collateral_lovelace, 5_000_000);
    assert_eq!(config.wallet.signing_key_env, "CARDANO_SIGNING_KEY");
    assert!(config.validate().is_ok());
}

/// What is tested: a full TOML file is parsed
/// Why: every section of the template must be readable
#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[network]
name = "mainnet"
blockfrost_url = "http://127.0.0.1:3000/api/v0/"
api_key_env = "MY_BLOCKFROST_KEY"

[blueprint]
path = "validators/plutus.json"
escrow_validator = "escrow.escrow"
hello_world_validator = "hello"

[transaction]
validity_window_secs = 600
collateral_lovelace = 3000000
min_change_lovelace = 2000000
confirmation_wait_secs = 5

[wallet]
signing_key_env = "MY_KEY"
signing_key_file_env = "MY_KEY_FILE"
"#,
    );

    let config = OffchainConfig::load_from_path(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.network.name, Network::Mainnet);
    assert_eq!(config.network.base_url(), "http://127.0.0.1:3000/api/v0");
    assert_eq!(config.blueprint.path, "validators/plutus.json");
    assert_eq!(config.blueprint.hello_world_validator, "hello");
    assert_eq!(config.transaction.validity_window_secs, 600);
    assert_eq!(config.transaction.min_change_lovelace, 2_000_000);
    assert_eq!(config.transaction.confirmation_wait_secs, 5);
    assert_eq!(config.wallet.signing_key_file_env, "MY_KEY_FILE");
}

/// What is tested: omitted sections take their defaults
#[test]
fn test_load_partial_config() {
    let file = write_config("[network]\nname = \"preview\"\n");
    let config = OffchainConfig::load_from_path(Some(file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.network.name, Network::Preview);
    assert_eq!(
        config.network.base_url(),
        "https://cardano-preview.blockfrost.io/api/v0"
    );
    assert_eq!(config.transaction.validity_window_secs, 900);
}

/// What is tested: an explicitly requested file that does not exist is an error
/// Why: a typo in --config must not silently fall back to defaults
#[test]
fn test_load_missing_explicit_path() {
    let result = OffchainConfig::load_from_path(Some("/nonexistent/offchain.toml"));
    let err = result.unwrap_err().to_string();
    assert!(err.contains("not found"), "unexpected error: {}", err);
}

/// What is tested: unknown network names fail to parse
#[test]
fn test_load_unknown_network() {
    let file = write_config("[network]\nname = \"testnet\"\n");
    let err = OffchainConfig::load_from_path(Some(file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"), "unexpected error: {}", err);
}

// ============================================================================
// VALIDATION TESTS
// ============================================================================

/// What is tested: validate() rejects non-http Blockfrost URLs
#[test]
fn test_validate_rejects_bad_url() {
    let mut config = OffchainConfig::default();
    config.network.blockfrost_url = Some("cardano-preprod.blockfrost.io".to_string());
    assert!(config.validate().is_err());
}

/// What is tested: validate() rejects a zero validity window and tiny collateral
#[test]
fn test_validate_rejects_bad_transaction_settings() {
    let mut config = OffchainConfig::default();
    config.transaction.validity_window_secs = 0;
    assert!(config.validate().is_err());

    let mut config = OffchainConfig::default();
    config.transaction.collateral_lovelace = 500_000;
    assert!(config.validate().is_err());
}

/// What is tested: validate() rejects empty env var names and validator titles
#[test]
fn test_validate_rejects_empty_names() {
    let mut config = OffchainConfig::default();
    config.network.api_key_env = " ".to_string();
    assert!(config.validate().is_err());

    let mut config = OffchainConfig::default();
    config.blueprint.escrow_validator = String::new();
    assert!(config.validate().is_err());
}

// ============================================================================
// NETWORK TESTS
// ============================================================================

/// What is tested: each network maps to its Blockfrost endpoint and address network
#[test]
fn test_network_endpoints() {
    assert_eq!(
        Network::Mainnet.blockfrost_url(),
        "https://cardano-mainnet.blockfrost.io/api/v0"
    );
    assert_eq!(
        Network::Preprod.blockfrost_url(),
        "https://cardano-preprod.blockfrost.io/api/v0"
    );
    assert_eq!(
        Network::Mainnet.address_network(),
        pallas_addresses::Network::Mainnet
    );
    assert_eq!(
        Network::Preview.address_network(),
        pallas_addresses::Network::Testnet
    );
}

/// What is tested: the API key is read from the configured env var
/// Why: a missing key must be reported by variable name before any request
#[test]
fn test_api_key_lookup() {
    let config = NetworkConfig {
        api_key_env: "CONFIG_TESTS_BLOCKFROST_KEY".to_string(),
        ..NetworkConfig::default()
    };

    assert_eq!(
        config.api_key().unwrap_err(),
        OffchainError::MissingEnv("CONFIG_TESTS_BLOCKFROST_KEY".to_string())
    );

    std::env::set_var("CONFIG_TESTS_BLOCKFROST_KEY", "preprodABC");
    assert_eq!(config.api_key().unwrap(), "preprodABC");
    std::env::remove_var("CONFIG_TESTS_BLOCKFROST_KEY");
}

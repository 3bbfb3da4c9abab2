//! Shared test helpers for off-chain client tests
//!
//! This module provides constants and helper functions used by the integration tests.

#![allow(dead_code)]

use cardano_offchain::{
    chains::{AddressUtxo, Amount},
    config::{Network, TransactionConfig},
    BlockfrostClient, ChainContext, EscrowConfig, EscrowState, Wallet,
};

// ============================================================================
// CONSTANTS
// ============================================================================

// -------------------------------- KEYS ----------------------------------

/// Dummy buyer payment key hash (28 bytes)
pub const DUMMY_BUYER_PKH: [u8; 28] = [0x11; 28];

/// Dummy seller payment key hash (28 bytes)
pub const DUMMY_SELLER_PKH: [u8; 28] = [0x22; 28];

/// Dummy owner payment key hash, hex encoded (56 hex characters)
pub const DUMMY_OWNER_PKH_HEX: &str = "33333333333333333333333333333333333333333333333333333333";

/// Dummy Ed25519 seed (64 hex characters)
pub const DUMMY_SIGNING_KEY_HEX: &str =
    "0101010101010101010101010101010101010101010101010101010101010101";

// ------------------------------- SCRIPTS --------------------------------

/// Dummy compiled validator (any non-empty hex is accepted off-chain)
pub const DUMMY_COMPILED_CODE: &str =
    "58340100003232323222253330044a229309b2b19bae001357446ae88d5d11aab9e5573a6ea80048";

// -------------------------------- OTHER ---------------------------------

/// Dummy transaction hash (64 hex characters)
pub const DUMMY_TX_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000012";

/// Second dummy transaction hash, sorting after DUMMY_TX_HASH
pub const DUMMY_TX_HASH_2: &str =
    "00000000000000000000000000000000000000000000000000000000000000ab";

/// Dummy Blockfrost project id
pub const DUMMY_PROJECT_ID: &str = "preprodTESTKEY";

/// Dummy deadline (2023-11-14T22:13:20Z)
pub const DUMMY_DEADLINE: i64 = 1_700_000_000;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Create a default escrow configuration with test values.
/// This can be customized using Rust's struct update syntax:
/// ```
/// let config = EscrowConfig {
///     nonce: 7,
///     ..create_default_escrow_config()
/// };
/// ```
pub fn create_default_escrow_config() -> EscrowConfig {
    EscrowConfig {
        buyer: DUMMY_BUYER_PKH,
        seller: DUMMY_SELLER_PKH,
        amount: 5_000_000,
        deadline: DUMMY_DEADLINE,
        nonce: 42,
        state: EscrowState::Active,
    }
}

/// Create a pure-ADA UTxO.
pub fn create_utxo(tx_hash: &str, output_index: u32, lovelace: u64) -> AddressUtxo {
    AddressUtxo {
        tx_hash: tx_hash.to_string(),
        output_index,
        amount: vec![Amount {
            unit: "lovelace".to_string(),
            quantity: lovelace.to_string(),
        }],
        data_hash: None,
        inline_datum: None,
        reference_script_hash: None,
    }
}

/// Create a UTxO holding a native token besides ADA.
pub fn create_token_utxo(tx_hash: &str, output_index: u32, lovelace: u64) -> AddressUtxo {
    let mut utxo = create_utxo(tx_hash, output_index, lovelace);
    utxo.amount.push(Amount {
        unit: format!("{}{}", "ab".repeat(28), hex::encode("TOKEN")),
        quantity: "1".to_string(),
    });
    utxo
}

/// Create the test wallet on preprod.
pub fn create_test_wallet() -> Wallet {
    let signing_key = cardano_offchain::crypto::parse_signing_key(DUMMY_SIGNING_KEY_HEX).unwrap();
    Wallet::new(signing_key, Network::Preprod)
}

/// Create a chain context pointed at a mock Blockfrost server.
pub fn create_test_context(base_url: &str) -> ChainContext {
    let provider = BlockfrostClient::new(base_url, DUMMY_PROJECT_ID).unwrap();
    ChainContext::new(provider, Network::Preprod, TransactionConfig::default())
}

/// Aiken-style blueprint containing the escrow and hello-world validators.
pub fn create_blueprint_json(plutus_version: &str) -> String {
    serde_json::json!({
        "preamble": {
            "title": "aiken-lang/escrow",
            "version": "0.0.0",
            "plutusVersion": plutus_version
        },
        "validators": [
            {
                "title": "escrow.escrow.spend",
                "compiledCode": DUMMY_COMPILED_CODE
            },
            {
                "title": "hello_world.hello_world.spend",
                "compiledCode": "4e4d01000033222220051200120011"
            }
        ]
    })
    .to_string()
}

/// Blockfrost protocol parameters response with realistic preprod values.
pub fn create_protocol_params_json() -> serde_json::Value {
    serde_json::json!({
        "epoch": 100,
        "min_fee_a": 44,
        "min_fee_b": 155381,
        "max_tx_size": 16384,
        "price_mem": 0.0577,
        "price_step": 0.0000721,
        "max_tx_ex_mem": "14000000",
        "max_tx_ex_steps": "10000000000",
        "collateral_percent": 150,
        "cost_models_raw": {
            "PlutusV2": (0..175).collect::<Vec<i64>>()
        }
    })
}

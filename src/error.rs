//! Error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffchainError {
    #[error("Unknown escrow action: {0}")]
    InvalidAction(String),

    #[error("{0} environment variable required")]
    MissingEnv(String),

    #[error("Validator matching '{0}' not found in blueprint")]
    ValidatorNotFound(String),

    #[error("Invalid datum: {0}")]
    InvalidDatum(String),

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid UTxO reference '{0}': expected <tx_hash>#<output_index>")]
    InvalidUtxoRef(String),

    #[error("CBOR error: {0}")]
    Cbor(String),

    #[error("Blockfrost API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Insufficient funds: need {needed} lovelace, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}

//! Chain Clients Module
//!
//! This module provides the client for the Blockfrost Cardano indexer.

pub mod blockfrost;

// Re-export for convenience
pub use blockfrost::{
    AddressUtxo, Amount, BlockfrostClient, EvaluatedRedeemer, ProtocolParams, RedeemerTag,
};

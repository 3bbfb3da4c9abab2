//! Off-chain clients for the Aiken escrow and hello-world validators
//!
//! Provides Plutus datum/redeemer packing, Blockfrost indexer access, transaction
//! assembly and the contract clients used by the `escrow` and `hello_world` binaries.

pub mod address;
pub mod chains;
pub mod config;
pub mod context;
pub mod contracts;
pub mod crypto;
pub mod error;
pub mod plutus;
pub mod transaction;
pub mod units;
pub mod utxo;

// Re-export public types for convenience
pub use chains::{AddressUtxo, BlockfrostClient, ProtocolParams};
pub use config::{Network, OffchainConfig};
pub use context::ChainContext;
pub use contracts::{
    create_escrow_datum, create_escrow_redeemer, EscrowAction, EscrowConfig, EscrowContract,
    EscrowState, HelloWorldContract, LockResult,
};
pub use crypto::Wallet;
pub use error::OffchainError;
pub use plutus::{Blueprint, PlutusData, PlutusScript, PlutusVersion};
pub use transaction::{complete_and_submit, Payment, ScriptSpend, TxPlan};
pub use utxo::UtxoRef;

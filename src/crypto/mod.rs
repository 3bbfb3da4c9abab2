//! Cryptographic operations
//!
//! This module provides credential hashing and wallet signing.

pub mod hash;
pub mod signing;

// Re-export for convenience
pub use hash::{key_hash, parse_key_hash, script_hash, CREDENTIAL_HASH_LEN};
pub use signing::{parse_signing_key, Wallet};

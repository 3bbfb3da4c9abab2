//! Wallet signing key
//!
//! The wallet pays fees, provides collateral and signs every transaction. Keys are
//! read from the environment, either as raw hex / cborHex in a variable or as a
//! cardano-cli `.skey` envelope file.

use anyhow::{Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use serde::Deserialize;

use crate::address::{enterprise_address, Credential};
use crate::config::{Network, WalletConfig};
use crate::crypto::hash::{key_hash, CREDENTIAL_HASH_LEN};
use crate::error::OffchainError;

/// CBOR prefix of a 32-byte bytestring, as used in `.skey` cborHex fields
const CBOR_BYTES32_PREFIX: &str = "5820";

/// cardano-cli text envelope
#[derive(Debug, Deserialize)]
struct TextEnvelope {
    #[serde(rename = "type")]
    key_type: String,
    #[serde(rename = "cborHex")]
    cbor_hex: String,
}

/// Payment wallet backed by a single Ed25519 key.
pub struct Wallet {
    signing_key: SigningKey,
    network: Network,
}

impl Wallet {
    pub fn new(signing_key: SigningKey, network: Network) -> Self {
        Self {
            signing_key,
            network,
        }
    }

    /// Generates a fresh random key. Only meant for throw-away counterparties.
    pub fn generate(network: Network) -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self::new(signing_key, network)
    }

    /// Loads the wallet key from the environment.
    ///
    /// The variable named by `signing_key_env` takes priority; otherwise the
    /// `.skey` file named by `signing_key_file_env` is read.
    pub fn from_env(config: &WalletConfig, network: Network) -> Result<Self> {
        if let Some(value) = read_env(&config.signing_key_env) {
            let signing_key = parse_signing_key(&value)
                .with_context(|| format!("Failed to decode {}", config.signing_key_env))?;
            return Ok(Self::new(signing_key, network));
        }

        if let Some(path) = read_env(&config.signing_key_file_env) {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read signing key file: {}", path))?;
            let envelope: TextEnvelope = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse signing key file: {}", path))?;
            if !envelope.key_type.contains("SigningKey") {
                anyhow::bail!(OffchainError::InvalidKey(format!(
                    "{} holds a '{}', not a signing key",
                    path, envelope.key_type
                )));
            }
            let signing_key = parse_signing_key(&envelope.cbor_hex)?;
            return Ok(Self::new(signing_key, network));
        }

        Err(OffchainError::MissingEnv(format!(
            "{} or {}",
            config.signing_key_env, config.signing_key_file_env
        ))
        .into())
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn verification_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn key_hash(&self) -> [u8; CREDENTIAL_HASH_LEN] {
        key_hash(&self.verification_key())
    }

    /// Enterprise address (no stake part) of the wallet key.
    pub fn address(&self) -> Result<String> {
        enterprise_address(self.network, &Credential::Key(self.key_hash()))
    }

    /// Signs a transaction body hash.
    pub fn sign(&self, tx_hash: &[u8; 32]) -> [u8; 64] {
        self.signing_key.sign(tx_hash).to_bytes()
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Decodes a 32-byte Ed25519 seed from hex, accepting the `5820` cborHex prefix.
pub fn parse_signing_key(input: &str) -> Result<SigningKey> {
    let trimmed = input.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let hex_part = if hex_part.len() == 68 {
        hex_part.strip_prefix(CBOR_BYTES32_PREFIX).unwrap_or(hex_part)
    } else {
        hex_part
    };

    let bytes = hex::decode(hex_part)
        .map_err(|e| OffchainError::InvalidKey(format!("not valid hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(OffchainError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            bytes.len()
        ))
        .into());
    }

    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(SigningKey::from_bytes(&seed))
}

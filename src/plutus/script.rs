//! Compiled Plutus validator scripts

use std::fmt;
use std::str::FromStr;

use anyhow::Result;

use crate::address::{enterprise_address, Credential};
use crate::config::Network;
use crate::crypto::hash::{script_hash, CREDENTIAL_HASH_LEN};

/// Plutus language version of a compiled script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlutusVersion {
    V1,
    V2,
    V3,
}

impl PlutusVersion {
    /// Byte prepended to the script bytes when hashing
    pub fn language_tag(&self) -> u8 {
        match self {
            PlutusVersion::V1 => 1,
            PlutusVersion::V2 => 2,
            PlutusVersion::V3 => 3,
        }
    }

    /// Key of the version's cost model in the indexer's `cost_models_raw`
    pub fn cost_model_key(&self) -> &'static str {
        match self {
            PlutusVersion::V1 => "PlutusV1",
            PlutusVersion::V2 => "PlutusV2",
            PlutusVersion::V3 => "PlutusV3",
        }
    }
}

impl FromStr for PlutusVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "plutusv1" => Ok(PlutusVersion::V1),
            "v2" | "plutusv2" => Ok(PlutusVersion::V2),
            "v3" | "plutusv3" => Ok(PlutusVersion::V3),
            other => anyhow::bail!("Unsupported Plutus version: {}", other),
        }
    }
}

impl fmt::Display for PlutusVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cost_model_key())
    }
}

/// A compiled validator as found in the blueprint's `compiledCode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlutusScript {
    pub version: PlutusVersion,
    pub code: Vec<u8>,
}

impl PlutusScript {
    pub fn new(version: PlutusVersion, code: Vec<u8>) -> Self {
        Self { version, code }
    }

    pub fn from_hex(version: PlutusVersion, compiled_code: &str) -> Result<Self> {
        let code = hex::decode(compiled_code.trim())
            .map_err(|e| anyhow::anyhow!("compiledCode is not valid hex: {}", e))?;
        if code.is_empty() {
            anyhow::bail!("compiledCode is empty");
        }
        Ok(Self::new(version, code))
    }

    pub fn hash(&self) -> [u8; CREDENTIAL_HASH_LEN] {
        script_hash(self.version.language_tag(), &self.code)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash())
    }

    /// Enterprise address locking funds under this script.
    pub fn address(&self, network: Network) -> Result<String> {
        enterprise_address(network, &Credential::Script(self.hash()))
    }
}

//! Aiken blueprint (`plutus.json`) loading
//!
//! Only the fields needed to rebuild a validator are read: the preamble's Plutus
//! version and each validator's title and compiled code.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::error::OffchainError;
use crate::plutus::script::{PlutusScript, PlutusVersion};

#[derive(Debug, Clone, Deserialize)]
pub struct Blueprint {
    pub preamble: Preamble,
    #[serde(default)]
    pub validators: Vec<BlueprintValidator>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preamble {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub plutus_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintValidator {
    pub title: String,
    pub compiled_code: String,
    /// Script hash as computed by the compiler
    #[serde(default)]
    pub hash: Option<String>,
}

impl Blueprint {
    /// Reads and parses a blueprint file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read blueprint: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse blueprint: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Plutus version declared in the preamble; V2 when absent.
    pub fn plutus_version(&self) -> Result<PlutusVersion> {
        match &self.preamble.plutus_version {
            Some(version) => version.parse(),
            None => Ok(PlutusVersion::V2),
        }
    }

    /// First validator whose title contains `name` (case-insensitive).
    pub fn find_validator(&self, name: &str) -> Result<&BlueprintValidator, OffchainError> {
        let needle = name.to_lowercase();
        self.validators
            .iter()
            .find(|v| v.title.to_lowercase().contains(&needle))
            .ok_or_else(|| OffchainError::ValidatorNotFound(name.to_string()))
    }

    /// Builds the compiled script of the validator matching `name`.
    ///
    /// A mismatch between the computed hash and the compiler's recorded hash is
    /// logged but does not fail.
    pub fn script(&self, name: &str) -> Result<PlutusScript> {
        let validator = self.find_validator(name)?;
        let script = PlutusScript::from_hex(self.plutus_version()?, &validator.compiled_code)
            .with_context(|| format!("Invalid compiled code for validator '{}'", validator.title))?;

        if let Some(expected) = &validator.hash {
            let computed = script.hash_hex();
            if !expected.eq_ignore_ascii_case(&computed) {
                warn!(
                    "⚠️  Blueprint hash {} for '{}' differs from computed {}",
                    expected, validator.title, computed
                );
            }
        }

        Ok(script)
    }
}

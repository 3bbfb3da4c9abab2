//! UTxO references

use std::fmt;
use std::str::FromStr;

use crate::error::OffchainError;

/// Handle to a transaction output: `<tx_hash>#<output_index>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtxoRef {
    /// Transaction id (64 hex chars, lowercase)
    pub tx_hash: String,
    pub output_index: u32,
}

impl UtxoRef {
    pub fn new(tx_hash: impl Into<String>, output_index: u32) -> Self {
        Self {
            tx_hash: tx_hash.into().to_lowercase(),
            output_index,
        }
    }

    /// Raw transaction id bytes.
    pub fn tx_hash_bytes(&self) -> Result<[u8; 32], OffchainError> {
        let bytes = hex::decode(&self.tx_hash)
            .map_err(|_| OffchainError::InvalidUtxoRef(self.to_string()))?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map_err(|_| OffchainError::InvalidUtxoRef(self.to_string()))
    }
}

impl FromStr for UtxoRef {
    type Err = OffchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OffchainError::InvalidUtxoRef(s.to_string());
        let (hash, index) = s.trim().split_once('#').ok_or_else(invalid)?;
        if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let output_index = index.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(hash, output_index))
    }
}

impl fmt::Display for UtxoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.output_index)
    }
}

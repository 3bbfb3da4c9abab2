//! Chain context
//!
//! Explicit handle threaded through every contract operation: the indexer client,
//! the network and the transaction settings. Nothing here is global.

use anyhow::{Context, Result};
use tracing::debug;

use crate::chains::{AddressUtxo, BlockfrostClient};
use crate::config::{Network, OffchainConfig, TransactionConfig};
use crate::plutus::PlutusData;

pub struct ChainContext {
    pub provider: BlockfrostClient,
    pub network: Network,
    pub tx: TransactionConfig,
}

impl ChainContext {
    pub fn new(provider: BlockfrostClient, network: Network, tx: TransactionConfig) -> Self {
        Self {
            provider,
            network,
            tx,
        }
    }

    /// Builds the context from configuration, reading the API key from the environment.
    pub fn from_config(config: &OffchainConfig) -> Result<Self> {
        let api_key = config.network.api_key()?;
        let provider = BlockfrostClient::new(config.network.base_url(), api_key)?;
        Ok(Self::new(
            provider,
            config.network.name,
            config.transaction.clone(),
        ))
    }

    /// All UTxOs at an address.
    pub fn utxos_at(&self, address: &str) -> Result<Vec<AddressUtxo>> {
        self.provider
            .address_utxos(address)
            .with_context(|| format!("Failed to fetch UTxOs at {}", address))
    }

    /// Decodes the datum attached to a UTxO: the inline datum when present,
    /// otherwise the datum fetched by hash. `None` when the output carries no datum.
    pub fn resolve_datum(&self, utxo: &AddressUtxo) -> Result<Option<PlutusData>> {
        if let Some(inline) = &utxo.inline_datum {
            let datum = PlutusData::from_cbor_hex(inline)
                .with_context(|| format!("Invalid inline datum on {}", utxo.utxo_ref()))?;
            return Ok(Some(datum));
        }

        match &utxo.data_hash {
            Some(hash) => {
                debug!("Fetching datum {} for {}", hash, utxo.utxo_ref());
                let cbor = self.provider.datum_cbor(hash)?;
                let datum = PlutusData::from_cbor_hex(&cbor)
                    .with_context(|| format!("Invalid datum {}", hash))?;
                Ok(Some(datum))
            }
            None => Ok(None),
        }
    }
}

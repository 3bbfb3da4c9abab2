//! Shelley address helpers
//!
//! Only enterprise addresses (payment credential, no stake part) are produced. Any
//! Shelley address is accepted as input when extracting a payment credential.

use anyhow::Result;
use pallas_addresses::{Address, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};
use pallas_crypto::hash::Hash;

use crate::config::Network;
use crate::crypto::hash::CREDENTIAL_HASH_LEN;
use crate::error::OffchainError;

/// Payment credential of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Key([u8; CREDENTIAL_HASH_LEN]),
    Script([u8; CREDENTIAL_HASH_LEN]),
}

impl Credential {
    pub fn hash(&self) -> &[u8; CREDENTIAL_HASH_LEN] {
        match self {
            Credential::Key(hash) | Credential::Script(hash) => hash,
        }
    }

    fn to_payment_part(self) -> ShelleyPaymentPart {
        match self {
            Credential::Key(hash) => ShelleyPaymentPart::Key(Hash::new(hash)),
            Credential::Script(hash) => ShelleyPaymentPart::Script(Hash::new(hash)),
        }
    }
}

/// Builds the bech32 enterprise address for a credential on the given network.
pub fn enterprise_address(network: Network, credential: &Credential) -> Result<String> {
    let address = ShelleyAddress::new(
        network.address_network(),
        credential.to_payment_part(),
        ShelleyDelegationPart::Null,
    );
    Address::Shelley(address)
        .to_bech32()
        .map_err(|e| OffchainError::InvalidAddress(e.to_string()).into())
}

/// Parses a bech32 Shelley address into the ledger representation.
pub fn parse_address(bech32: &str) -> Result<Address> {
    Address::from_bech32(bech32.trim())
        .map_err(|e| OffchainError::InvalidAddress(format!("{}: {}", bech32, e)).into())
}

/// Extracts the payment credential of a Shelley address.
pub fn payment_credential(bech32: &str) -> Result<Credential> {
    match parse_address(bech32)? {
        Address::Shelley(shelley) => {
            let mut hash = [0u8; CREDENTIAL_HASH_LEN];
            match shelley.payment() {
                ShelleyPaymentPart::Key(h) => {
                    hash.copy_from_slice(h.as_ref());
                    Ok(Credential::Key(hash))
                }
                ShelleyPaymentPart::Script(h) => {
                    hash.copy_from_slice(h.as_ref());
                    Ok(Credential::Script(hash))
                }
            }
        }
        _ => Err(OffchainError::InvalidAddress(format!(
            "{} is not a Shelley address",
            bech32
        ))
        .into()),
    }
}

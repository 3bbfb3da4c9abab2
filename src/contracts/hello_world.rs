//! Hello-World Contract Client
//!
//! Funds locked under the hello-world validator carry the owner's key hash as datum
//! and are released by a transaction signed by the owner with the redeemer
//! `"Hello, World!"`.

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::chains::AddressUtxo;
use crate::context::ChainContext;
use crate::crypto::{Wallet, CREDENTIAL_HASH_LEN};
use crate::plutus::{PlutusData, PlutusScript};
use crate::transaction::{complete_and_submit, Payment, ScriptSpend, TxPlan};
use crate::units::format_ada;

/// Message the validator expects in the redeemer
pub const HELLO_WORLD_MESSAGE: &str = "Hello, World!";

/// Environment variable holding the script address
pub const SCRIPT_ADDRESS_ENV: &str = "HELLO_WORLD_SCRIPT_ADDRESS";

/// Environment variable holding the default owner key hash
pub const OWNER_PKH_ENV: &str = "OWNER_PUBKEY_HASH";

/// `Constr 0 [B owner]`
pub fn hello_world_datum(owner: &[u8; CREDENTIAL_HASH_LEN]) -> PlutusData {
    PlutusData::constr(0, vec![PlutusData::bytes(owner.to_vec())])
}

/// `Constr 0 [B "Hello, World!"]`
pub fn hello_world_redeemer() -> PlutusData {
    PlutusData::constr(0, vec![PlutusData::bytes(HELLO_WORLD_MESSAGE.as_bytes())])
}

/// Client for the hello-world validator.
pub struct HelloWorldContract<'a> {
    ctx: &'a ChainContext,
    script_address: String,
    /// Compiled validator, required to unlock
    script: Option<PlutusScript>,
}

impl<'a> HelloWorldContract<'a> {
    /// Creates the client for a configured script address.
    ///
    /// When the compiled script is known, the address derived from it is compared
    /// with the configured one and a mismatch is logged.
    pub fn new(
        ctx: &'a ChainContext,
        script_address: impl Into<String>,
        script: Option<PlutusScript>,
    ) -> Result<Self> {
        let script_address = script_address.into();
        if let Some(script) = &script {
            let derived = script.address(ctx.network)?;
            if derived != script_address {
                warn!(
                    "⚠️  {} is {} but the blueprint validator derives {}",
                    SCRIPT_ADDRESS_ENV, script_address, derived
                );
            }
        }

        Ok(Self {
            ctx,
            script_address,
            script,
        })
    }

    pub fn script_address(&self) -> &str {
        &self.script_address
    }

    /// Locks `amount` lovelace for `owner`.
    pub fn lock(
        &self,
        wallet: &Wallet,
        amount: u64,
        owner: &[u8; CREDENTIAL_HASH_LEN],
    ) -> Result<String> {
        let plan = TxPlan::new().pay(
            Payment::new(self.script_address.clone(), amount)
                .with_inline_datum(hello_world_datum(owner)),
        );

        let tx_hash = complete_and_submit(self.ctx, wallet, &plan)
            .inspect_err(|e| error!("❌ Failed to lock funds: {:#}", e))?;
        info!("✅ Locked {} at {}: {}", format_ada(amount), self.script_address, tx_hash);
        Ok(tx_hash)
    }

    /// Spends a script UTxO with the hello-world redeemer, sending the funds back to
    /// the wallet. The wallet key is the required signer.
    pub fn unlock(&self, wallet: &Wallet, script_utxo: &AddressUtxo) -> Result<String> {
        self.unlock_inner(wallet, script_utxo)
            .inspect_err(|e| error!("❌ Failed to unlock funds: {:#}", e))
    }

    fn unlock_inner(&self, wallet: &Wallet, script_utxo: &AddressUtxo) -> Result<String> {
        let script = self
            .script
            .clone()
            .context("Hello-world validator not loaded from blueprint; cannot unlock")?;

        let witness_datum = if script_utxo.inline_datum.is_none() {
            Some(hello_world_datum(&wallet.key_hash()))
        } else {
            None
        };

        let plan = TxPlan::new()
            .spend_script(ScriptSpend {
                utxo: script_utxo.utxo_ref(),
                lovelace: script_utxo.lovelace(),
                script,
                redeemer: hello_world_redeemer(),
                witness_datum,
            })
            .require_signer(wallet.key_hash());

        let tx_hash = complete_and_submit(self.ctx, wallet, &plan)?;
        info!("✅ Unlocked {}: {}", script_utxo.utxo_ref(), tx_hash);
        Ok(tx_hash)
    }

    /// All UTxOs at the script address.
    pub fn get_script_utxos(&self) -> Result<Vec<AddressUtxo>> {
        self.ctx
            .utxos_at(&self.script_address)
            .inspect_err(|e| error!("❌ Failed to fetch script UTxOs: {:#}", e))
    }
}

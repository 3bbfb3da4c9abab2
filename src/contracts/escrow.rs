//! Escrow Contract Client
//!
//! Locks funds under the escrow validator and later releases them. The datum carries
//! buyer, seller, amount, deadline and a nonce that keeps otherwise identical escrows
//! distinct; the redeemer selects the validator's code path.
//!
//! Amount and deadline checks are enforced on-chain. The client only packs fields.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, error, info};

use crate::address::{enterprise_address, payment_credential, Credential};
use crate::chains::AddressUtxo;
use crate::context::ChainContext;
use crate::crypto::{parse_key_hash, Wallet, CREDENTIAL_HASH_LEN};
use crate::error::OffchainError;
use crate::plutus::{Blueprint, PlutusData, PlutusScript};
use crate::transaction::{complete_and_submit, Payment, ScriptSpend, TxPlan};
use crate::units::{deadline_from_now, format_ada, format_deadline};
use crate::utxo::UtxoRef;

/// Exclusive upper bound of generated nonces
pub const NONCE_RANGE: u64 = 1_000_000;

// ============================================================================
// DATUM AND REDEEMER
// ============================================================================

/// On-chain escrow state, constructor 0 and 1 of the datum's last field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowState {
    Active,
    Completed,
}

impl EscrowState {
    fn to_plutus_data(self) -> PlutusData {
        match self {
            EscrowState::Active => PlutusData::unit(0),
            EscrowState::Completed => PlutusData::unit(1),
        }
    }
}

/// Escrow parameters serialized verbatim into the datum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowConfig {
    pub buyer: [u8; CREDENTIAL_HASH_LEN],
    pub seller: [u8; CREDENTIAL_HASH_LEN],
    /// Lovelace owed to the seller
    pub amount: u64,
    /// POSIX seconds
    pub deadline: i64,
    pub nonce: u64,
    pub state: EscrowState,
}

impl EscrowConfig {
    /// `Constr 0 [B buyer, B seller, I amount, I deadline, I nonce, Constr state []]`
    pub fn to_plutus_data(&self) -> PlutusData {
        PlutusData::constr(
            0,
            vec![
                PlutusData::bytes(self.buyer),
                PlutusData::bytes(self.seller),
                PlutusData::int(self.amount),
                PlutusData::int(self.deadline),
                PlutusData::int(self.nonce),
                self.state.to_plutus_data(),
            ],
        )
    }

    /// Decodes an escrow datum.
    pub fn from_plutus_data(data: &PlutusData) -> Result<Self, OffchainError> {
        let invalid = |reason: &str| OffchainError::InvalidDatum(reason.to_string());

        let fields = match data.as_constr() {
            Some((0, fields)) if fields.len() == 6 => fields,
            _ => return Err(invalid("expected constructor 0 with six fields")),
        };

        let buyer = key_hash_field(&fields[0]).ok_or_else(|| invalid("buyer is not a key hash"))?;
        let seller =
            key_hash_field(&fields[1]).ok_or_else(|| invalid("seller is not a key hash"))?;
        let amount = fields[2]
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| invalid("amount is not a lovelace quantity"))?;
        let deadline = fields[3]
            .as_int()
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| invalid("deadline is not a timestamp"))?;
        let nonce = fields[4]
            .as_int()
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| invalid("nonce is not a natural number"))?;
        let state = match fields[5].as_constr() {
            Some((0, [])) => EscrowState::Active,
            Some((1, [])) => EscrowState::Completed,
            _ => return Err(invalid("unknown escrow state")),
        };

        Ok(Self {
            buyer,
            seller,
            amount,
            deadline,
            nonce,
            state,
        })
    }
}

fn key_hash_field(data: &PlutusData) -> Option<[u8; CREDENTIAL_HASH_LEN]> {
    data.as_bytes().and_then(|b| <[u8; CREDENTIAL_HASH_LEN]>::try_from(b).ok())
}

/// Escrow redeemer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowAction {
    Complete,
    Cancel,
    Refund,
}

impl EscrowAction {
    /// Constructor alternative selecting the validator path
    pub fn tag(&self) -> u64 {
        match self {
            EscrowAction::Complete => 0,
            EscrowAction::Cancel => 1,
            EscrowAction::Refund => 2,
        }
    }

    pub fn to_redeemer(&self) -> PlutusData {
        PlutusData::unit(self.tag())
    }
}

impl FromStr for EscrowAction {
    type Err = OffchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete" => Ok(EscrowAction::Complete),
            "cancel" => Ok(EscrowAction::Cancel),
            "refund" => Ok(EscrowAction::Refund),
            other => Err(OffchainError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for EscrowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscrowAction::Complete => "complete",
            EscrowAction::Cancel => "cancel",
            EscrowAction::Refund => "refund",
        };
        f.write_str(name)
    }
}

/// Builds the datum for an escrow configuration.
pub fn create_escrow_datum(config: &EscrowConfig) -> PlutusData {
    config.to_plutus_data()
}

/// Builds the redeemer for an action name (`complete`, `cancel` or `refund`).
pub fn create_escrow_redeemer(action: &str) -> Result<PlutusData, OffchainError> {
    Ok(action.parse::<EscrowAction>()?.to_redeemer())
}

/// Generates a fresh escrow nonce.
pub fn generate_nonce() -> u64 {
    rand::thread_rng().gen_range(0..NONCE_RANGE)
}

/// Resolves a seller given as a bech32 address or a hex key hash.
pub fn parse_seller(seller: &str) -> Result<[u8; CREDENTIAL_HASH_LEN]> {
    if seller.trim().starts_with("addr") {
        match payment_credential(seller)? {
            Credential::Key(hash) => Ok(hash),
            Credential::Script(_) => Err(OffchainError::InvalidAddress(format!(
                "seller {} is a script address",
                seller
            ))
            .into()),
        }
    } else {
        parse_key_hash(seller)
    }
}

// ============================================================================
// CONTRACT CLIENT
// ============================================================================

/// Result of a successful lock.
#[derive(Debug, Clone)]
pub struct LockResult {
    pub tx_hash: String,
    pub config: EscrowConfig,
}

/// A UTxO at the escrow address together with its decoded datum.
#[derive(Debug, Clone)]
pub struct EscrowUtxo {
    pub utxo: AddressUtxo,
    pub config: EscrowConfig,
}

/// Client for the escrow validator.
pub struct EscrowContract<'a> {
    ctx: &'a ChainContext,
    script: PlutusScript,
}

impl<'a> EscrowContract<'a> {
    pub fn new(ctx: &'a ChainContext, script: PlutusScript) -> Self {
        Self { ctx, script }
    }

    /// Loads the validator whose title contains `validator_name`.
    pub fn from_blueprint(
        ctx: &'a ChainContext,
        blueprint: &Blueprint,
        validator_name: &str,
    ) -> Result<Self> {
        let script = blueprint
            .script(validator_name)
            .context("Failed to load escrow validator")?;
        Ok(Self::new(ctx, script))
    }

    pub fn script(&self) -> &PlutusScript {
        &self.script
    }

    /// Enterprise address of the escrow script.
    pub fn script_address(&self) -> Result<String> {
        self.script.address(self.ctx.network)
    }

    /// Locks `amount` lovelace for `seller` until `deadline_hours` from now.
    ///
    /// The wallet is the buyer. The datum is attached inline.
    ///
    /// # Returns
    ///
    /// * `Ok(LockResult)` - Transaction id and the datum fields that were locked
    /// * `Err(anyhow::Error)` - Seller invalid, funds insufficient or submission failed
    pub fn lock_funds(
        &self,
        wallet: &Wallet,
        seller: &str,
        amount: u64,
        deadline_hours: u64,
    ) -> Result<LockResult> {
        self.lock_funds_inner(wallet, seller, amount, deadline_hours)
            .inspect_err(|e| error!("❌ Failed to lock funds: {:#}", e))
    }

    fn lock_funds_inner(
        &self,
        wallet: &Wallet,
        seller: &str,
        amount: u64,
        deadline_hours: u64,
    ) -> Result<LockResult> {
        let config = EscrowConfig {
            buyer: wallet.key_hash(),
            seller: parse_seller(seller)?,
            amount,
            deadline: deadline_from_now(deadline_hours)?,
            nonce: generate_nonce(),
            state: EscrowState::Active,
        };

        let script_address = self.script_address()?;
        let plan = TxPlan::new().pay(
            Payment::new(script_address, amount).with_inline_datum(create_escrow_datum(&config)),
        );
        let tx_hash = complete_and_submit(self.ctx, wallet, &plan)?;

        info!("✅ Funds locked in escrow: {}", tx_hash);
        info!("   Amount: {}", format_ada(amount));
        info!("   Deadline: {}", format_deadline(config.deadline));
        info!("   Nonce: {}", config.nonce);

        Ok(LockResult { tx_hash, config })
    }

    /// Completes an escrow: pays `amount` to the seller and returns the rest to the wallet.
    pub fn complete_escrow(
        &self,
        wallet: &Wallet,
        utxo: &UtxoRef,
        config: &EscrowConfig,
    ) -> Result<String> {
        self.spend(wallet, utxo, config, EscrowAction::Complete)
            .inspect_err(|e| error!("❌ Failed to complete escrow: {:#}", e))
    }

    /// Cancels an escrow, returning the locked funds to the wallet.
    pub fn cancel_escrow(
        &self,
        wallet: &Wallet,
        utxo: &UtxoRef,
        config: &EscrowConfig,
    ) -> Result<String> {
        self.spend(wallet, utxo, config, EscrowAction::Cancel)
            .inspect_err(|e| error!("❌ Failed to cancel escrow: {:#}", e))
    }

    /// Refunds an escrow to the buyer wallet.
    pub fn refund_escrow(
        &self,
        wallet: &Wallet,
        utxo: &UtxoRef,
        config: &EscrowConfig,
    ) -> Result<String> {
        self.spend(wallet, utxo, config, EscrowAction::Refund)
            .inspect_err(|e| error!("❌ Failed to refund escrow: {:#}", e))
    }

    fn spend(
        &self,
        wallet: &Wallet,
        utxo_ref: &UtxoRef,
        config: &EscrowConfig,
        action: EscrowAction,
    ) -> Result<String> {
        let script_address = self.script_address()?;
        let utxos = self.ctx.utxos_at(&script_address)?;
        let utxo = utxos
            .iter()
            .find(|u| &u.utxo_ref() == utxo_ref)
            .with_context(|| format!("Escrow UTxO {} not found at {}", utxo_ref, script_address))?;

        let witness_datum = if utxo.inline_datum.is_none() {
            Some(create_escrow_datum(config))
        } else {
            None
        };

        let mut plan = TxPlan::new()
            .spend_script(ScriptSpend {
                utxo: utxo_ref.clone(),
                lovelace: utxo.lovelace(),
                script: self.script.clone(),
                redeemer: action.to_redeemer(),
                witness_datum,
            })
            .require_signer(wallet.key_hash());

        if action == EscrowAction::Complete {
            let seller_address =
                enterprise_address(self.ctx.network, &Credential::Key(config.seller))?;
            plan = plan.pay(Payment::new(seller_address, config.amount));
        }

        let tx_hash = complete_and_submit(self.ctx, wallet, &plan)?;
        info!("✅ Escrow {} submitted: {}", action, tx_hash);
        Ok(tx_hash)
    }

    /// Lists escrow UTxOs: every output at the script address carrying a datum
    /// that decodes as an escrow datum. Outputs whose datum is foreign, malformed or
    /// not published are skipped.
    pub fn find_escrow_utxos(&self) -> Result<Vec<EscrowUtxo>> {
        self.find_escrow_utxos_inner()
            .inspect_err(|e| error!("❌ Failed to find escrow UTxOs: {:#}", e))
    }

    fn find_escrow_utxos_inner(&self) -> Result<Vec<EscrowUtxo>> {
        let script_address = self.script_address()?;
        let mut escrows = Vec::new();

        for utxo in self.ctx.utxos_at(&script_address)? {
            if !utxo.has_datum() {
                continue;
            }
            // Anyone can pay to the script address, so unreadable datums are skipped
            let datum = match self.ctx.resolve_datum(&utxo) {
                Ok(Some(datum)) => datum,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Skipping {}: {:#}", utxo.utxo_ref(), e);
                    continue;
                }
            };
            match EscrowConfig::from_plutus_data(&datum) {
                Ok(config) => escrows.push(EscrowUtxo { utxo, config }),
                Err(e) => debug!("Skipping {}: {}", utxo.utxo_ref(), e),
            }
        }

        Ok(escrows)
    }
}

//! Transaction assembly
//!
//! `pallas-txbuilder` serializes, hashes and witnesses a transaction but leaves coin
//! selection, fee calculation and change to the caller. This module supplies that
//! glue:
//!
//! 1. Select pure-ADA wallet inputs (largest first) covering outputs, a fee ceiling
//!    and the minimum change.
//! 2. Build a signed draft with the fee ceiling and, when a script is spent, the
//!    maximum execution budget.
//! 3. Ask the indexer to evaluate the draft's scripts.
//! 4. Compute the fee from the draft size and the evaluated units, rebuild, sign
//!    and submit.

use anyhow::{Context, Result};
use pallas_addresses::Address;
use pallas_crypto::hash::Hash;
use pallas_crypto::key::ed25519::PublicKey;
use pallas_txbuilder::{BuildConway, ExUnits, Input, Output, ScriptKind, StagingTransaction};
use tracing::{debug, info};

use crate::address::parse_address;
use crate::chains::{AddressUtxo, ProtocolParams, RedeemerTag};
use crate::context::ChainContext;
use crate::crypto::{Wallet, CREDENTIAL_HASH_LEN};
use crate::error::OffchainError;
use crate::plutus::{PlutusData, PlutusScript, PlutusVersion};
use crate::utxo::UtxoRef;

/// Fee reserved while selecting inputs and placed in the draft transaction
pub const FEE_CEILING_LOVELACE: u64 = 2_000_000;

/// Extra bytes charged on top of the draft size. Covers the fee and execution unit
/// fields shrinking or growing between draft and final transaction.
const SIZE_PADDING_BYTES: u64 = 64;

// ============================================================================
// PLAN STRUCTURES
// ============================================================================

/// Payment to an address, optionally with an inline datum.
#[derive(Debug, Clone)]
pub struct Payment {
    pub address: String,
    pub lovelace: u64,
    pub datum: Option<PlutusData>,
}

impl Payment {
    pub fn new(address: impl Into<String>, lovelace: u64) -> Self {
        Self {
            address: address.into(),
            lovelace,
            datum: None,
        }
    }

    pub fn with_inline_datum(mut self, datum: PlutusData) -> Self {
        self.datum = Some(datum);
        self
    }
}

/// Spend of one script-locked UTxO.
#[derive(Debug, Clone)]
pub struct ScriptSpend {
    pub utxo: UtxoRef,
    /// Lovelace held by the script UTxO
    pub lovelace: u64,
    pub script: PlutusScript,
    pub redeemer: PlutusData,
    /// Datum to attach as a witness when the UTxO only carries a datum hash
    pub witness_datum: Option<PlutusData>,
}

/// Everything a transaction must do, before inputs, fee and change are decided.
#[derive(Debug, Clone, Default)]
pub struct TxPlan {
    pub payments: Vec<Payment>,
    pub script_spend: Option<ScriptSpend>,
    pub required_signers: Vec<[u8; CREDENTIAL_HASH_LEN]>,
}

impl TxPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pay(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    pub fn spend_script(mut self, spend: ScriptSpend) -> Self {
        self.script_spend = Some(spend);
        self
    }

    pub fn require_signer(mut self, key_hash: [u8; CREDENTIAL_HASH_LEN]) -> Self {
        if !self.required_signers.contains(&key_hash) {
            self.required_signers.push(key_hash);
        }
        self
    }

    /// Sum of all payments; errors when it does not fit in a `u64`.
    pub fn payments_total(&self) -> Result<u64, OffchainError> {
        self.payments
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.lovelace))
            .ok_or_else(|| OffchainError::OutOfRange("total payment amount".to_string()))
    }

    fn script_value(&self) -> u64 {
        self.script_spend.as_ref().map_or(0, |s| s.lovelace)
    }
}

/// Inputs, fee and extras fixed for one build of a plan.
#[derive(Debug, Clone)]
struct Draft<'a> {
    wallet_inputs: Vec<UtxoRef>,
    collateral: Option<UtxoRef>,
    change_address: String,
    change: u64,
    fee: u64,
    validity: Option<(u64, u64)>,
    ex_units: (u64, u64),
    cost_model: Vec<i64>,
    plan: &'a TxPlan,
}

/// Signed, serialized transaction.
#[derive(Debug, Clone)]
pub struct SignedTx {
    pub tx_hash: [u8; 32],
    pub bytes: Vec<u8>,
}

impl SignedTx {
    pub fn tx_hash_hex(&self) -> String {
        hex::encode(self.tx_hash)
    }
}

// ============================================================================
// SELECTION AND FEE ARITHMETIC
// ============================================================================

/// Selects pure-ADA UTxOs, largest first, until they cover `target` lovelace.
///
/// # Returns
///
/// * `Ok(Vec<&AddressUtxo>)` - Selected UTxOs (possibly empty when `target` is 0)
/// * `Err(OffchainError::InsufficientFunds)` - All candidates together fall short
pub fn select_inputs(
    utxos: &[AddressUtxo],
    target: u64,
) -> Result<Vec<&AddressUtxo>, OffchainError> {
    let mut candidates: Vec<&AddressUtxo> =
        utxos.iter().filter(|u| u.is_pure_lovelace()).collect();
    candidates.sort_by(|a, b| b.lovelace().cmp(&a.lovelace()));

    let mut selected = Vec::new();
    let mut total = 0u64;
    for utxo in candidates {
        if total >= target {
            break;
        }
        total = total.saturating_add(utxo.lovelace());
        selected.push(utxo);
    }

    if total < target {
        return Err(OffchainError::InsufficientFunds {
            needed: target,
            available: total,
        });
    }
    Ok(selected)
}

/// Picks the smallest pure-ADA UTxO holding at least `minimum` lovelace.
pub fn select_collateral(
    utxos: &[AddressUtxo],
    minimum: u64,
) -> Result<&AddressUtxo, OffchainError> {
    utxos
        .iter()
        .filter(|u| u.is_pure_lovelace() && u.lovelace() >= minimum)
        .min_by_key(|u| u.lovelace())
        .ok_or_else(|| OffchainError::InsufficientFunds {
            needed: minimum,
            available: utxos
                .iter()
                .filter(|u| u.is_pure_lovelace())
                .map(AddressUtxo::lovelace)
                .max()
                .unwrap_or(0),
        })
}

/// Size-based part of the fee: `min_fee_a * size + min_fee_b`.
pub fn linear_fee(params: &ProtocolParams, size_bytes: u64) -> u64 {
    params.min_fee_a * size_bytes + params.min_fee_b
}

/// Execution part of the fee: `ceil(price_mem * mem + price_step * steps)`.
pub fn script_fee(params: &ProtocolParams, memory: u64, steps: u64) -> u64 {
    let price_mem = params.price_mem.unwrap_or(0.0);
    let price_step = params.price_step.unwrap_or(0.0);
    (price_mem * memory as f64 + price_step * steps as f64).ceil() as u64
}

/// Position of `script_input` among all inputs in ledger order (sorted by tx hash,
/// then output index). Redeemer pointers refer to this position.
pub fn spend_redeemer_index(inputs: &[UtxoRef], script_input: &UtxoRef) -> Option<u32> {
    let mut sorted: Vec<&UtxoRef> = inputs.iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted
        .iter()
        .position(|input| *input == script_input)
        .map(|pos| pos as u32)
}

/// Validity interval `[tip, tip + window)` in slots (one slot per second).
pub fn validity_interval(tip_slot: u64, window_secs: u64) -> (u64, u64) {
    (tip_slot, tip_slot + window_secs)
}

// ============================================================================
// BUILD AND SUBMIT
// ============================================================================

/// Balances, signs and submits a plan paid for by `wallet`.
///
/// # Returns
///
/// * `Ok(String)` - Transaction id reported by the indexer
/// * `Err(anyhow::Error)` - Selection, evaluation, assembly or submission failed
pub fn complete_and_submit(ctx: &ChainContext, wallet: &Wallet, plan: &TxPlan) -> Result<String> {
    let signed = build_signed(ctx, wallet, plan)?;
    debug!(
        "Submitting transaction {} ({} bytes)",
        signed.tx_hash_hex(),
        signed.bytes.len()
    );
    let tx_id = ctx
        .provider
        .submit_tx(&signed.bytes)
        .context("Failed to submit transaction")?;
    info!("✅ Transaction submitted: {}", tx_id);
    Ok(tx_id)
}

/// Balances and signs a plan without submitting it.
pub fn build_signed(ctx: &ChainContext, wallet: &Wallet, plan: &TxPlan) -> Result<SignedTx> {
    let wallet_address = wallet.address()?;
    let wallet_utxos = ctx.utxos_at(&wallet_address)?;
    let params = ctx.provider.protocol_params()?;

    // Script value counts towards the outputs, the wallet covers the rest
    let target = plan
        .payments_total()?
        .checked_add(FEE_CEILING_LOVELACE)
        .and_then(|t| t.checked_add(ctx.tx.min_change_lovelace))
        .ok_or_else(|| OffchainError::OutOfRange("payment amount plus fee".to_string()))?
        .saturating_sub(plan.script_value());
    let selected = select_inputs(&wallet_utxos, target)?;
    let wallet_inputs: Vec<UtxoRef> = selected.iter().map(|u| u.utxo_ref()).collect();
    let total_in = selected
        .iter()
        .try_fold(plan.script_value(), |acc, u| acc.checked_add(u.lovelace()))
        .ok_or_else(|| OffchainError::OutOfRange("total input value".to_string()))?;

    let mut draft = Draft {
        wallet_inputs,
        collateral: None,
        change_address: wallet_address,
        change: 0,
        fee: FEE_CEILING_LOVELACE,
        validity: None,
        ex_units: (0, 0),
        cost_model: Vec::new(),
        plan,
    };
    draft.change = change_after(total_in, plan, draft.fee)?;

    if let Some(spend) = &plan.script_spend {
        let collateral = select_collateral(&wallet_utxos, ctx.tx.collateral_lovelace)?;
        draft.collateral = Some(collateral.utxo_ref());

        let tip = ctx.provider.latest_slot()?;
        draft.validity = Some(validity_interval(tip, ctx.tx.validity_window_secs));
        draft.ex_units = params.max_tx_ex_units();
        draft.cost_model = params
            .cost_model(spend.script.version.cost_model_key())
            .map(<[i64]>::to_vec)
            .with_context(|| {
                format!("Protocol parameters lack a {} cost model", spend.script.version)
            })?;

        let evaluation_draft = assemble(&draft, wallet)?;
        let evaluated = ctx
            .provider
            .evaluate_tx(&evaluation_draft.bytes)
            .context("Failed to evaluate script")?;

        let mut all_inputs = draft.wallet_inputs.clone();
        all_inputs.push(spend.utxo.clone());
        let index = spend_redeemer_index(&all_inputs, &spend.utxo)
            .context("Script input missing from transaction inputs")?;
        let units = evaluated
            .iter()
            .find(|r| r.tag == RedeemerTag::Spend && r.index == index)
            .ok_or_else(|| {
                OffchainError::Evaluation(format!("no execution units for spend:{}", index))
            })?;
        debug!("Evaluated spend:{} at mem={} steps={}", index, units.memory, units.steps);
        draft.ex_units = (units.memory, units.steps);
    }

    let sized = assemble(&draft, wallet)?;
    let mut fee = linear_fee(&params, sized.bytes.len() as u64 + SIZE_PADDING_BYTES);
    if plan.script_spend.is_some() {
        fee += script_fee(&params, draft.ex_units.0, draft.ex_units.1);
    }

    draft.fee = fee;
    draft.change = change_after(total_in, plan, fee)?;
    if draft.change < ctx.tx.min_change_lovelace {
        return Err(OffchainError::InsufficientFunds {
            needed: plan
                .payments_total()?
                .saturating_add(fee)
                .saturating_add(ctx.tx.min_change_lovelace),
            available: total_in,
        }
        .into());
    }

    debug!("Fee {} lovelace, change {} lovelace", fee, draft.change);
    assemble(&draft, wallet)
}

fn change_after(total_in: u64, plan: &TxPlan, fee: u64) -> Result<u64, OffchainError> {
    let needed = plan
        .payments_total()?
        .checked_add(fee)
        .ok_or_else(|| OffchainError::OutOfRange("payment amount plus fee".to_string()))?;
    total_in
        .checked_sub(needed)
        .ok_or(OffchainError::InsufficientFunds {
            needed,
            available: total_in,
        })
}

fn to_input(utxo: &UtxoRef) -> Result<Input> {
    Ok(Input::new(Hash::new(utxo.tx_hash_bytes()?), utxo.output_index as u64))
}

fn to_output(address: &str, lovelace: u64, datum: Option<&PlutusData>) -> Result<Output> {
    let address: Address = parse_address(address)?;
    let output = Output::new(address, lovelace);
    match datum {
        Some(datum) => Ok(output.set_inline_datum(datum.to_cbor()?)),
        None => Ok(output),
    }
}

fn script_kind(version: PlutusVersion) -> ScriptKind {
    match version {
        PlutusVersion::V1 => ScriptKind::PlutusV1,
        PlutusVersion::V2 => ScriptKind::PlutusV2,
        PlutusVersion::V3 => ScriptKind::PlutusV3,
    }
}

/// Serializes a draft with pallas-txbuilder and adds the wallet's witness.
fn assemble(draft: &Draft<'_>, wallet: &Wallet) -> Result<SignedTx> {
    let plan = draft.plan;
    let mut tx = StagingTransaction::new();

    for input in &draft.wallet_inputs {
        tx = tx.input(to_input(input)?);
    }
    for payment in &plan.payments {
        tx = tx.output(to_output(&payment.address, payment.lovelace, payment.datum.as_ref())?);
    }
    tx = tx.output(to_output(&draft.change_address, draft.change, None)?);
    tx = tx.fee(draft.fee);

    if let Some((from, until)) = draft.validity {
        tx = tx.valid_from_slot(from).invalid_from_slot(until);
    }

    if let Some(spend) = &plan.script_spend {
        let script_input = to_input(&spend.utxo)?;
        tx = tx
            .input(script_input.clone())
            .script(script_kind(spend.script.version), spend.script.code.clone())
            .add_spend_redeemer(
                script_input,
                spend.redeemer.to_cbor()?,
                Some(ExUnits {
                    mem: draft.ex_units.0,
                    steps: draft.ex_units.1,
                }),
            )
            .language_view(script_kind(spend.script.version), draft.cost_model.clone());
        if let Some(datum) = &spend.witness_datum {
            tx = tx.datum(datum.to_cbor()?);
        }
    }

    if let Some(collateral) = &draft.collateral {
        tx = tx.collateral_input(to_input(collateral)?);
    }

    for signer in &plan.required_signers {
        tx = tx.disclosed_signer(Hash::new(*signer));
    }

    let built = tx
        .build_conway_raw()
        .map_err(|e| anyhow::anyhow!("Failed to build transaction: {}", e))?;
    let tx_hash = built.tx_hash.0;
    let signature = wallet.sign(&tx_hash);
    let signed = built
        .add_signature(PublicKey::from(wallet.verification_key()), signature)
        .map_err(|e| anyhow::anyhow!("Failed to add signature: {}", e))?;

    Ok(SignedTx {
        tx_hash,
        bytes: signed.tx_bytes.0,
    })
}

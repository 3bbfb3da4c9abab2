//! Blockfrost API Client
//!
//! Blocking HTTP client for the Blockfrost Cardano indexer. Provides UTxO queries,
//! chain tip and protocol parameter lookups, datum retrieval, script evaluation and
//! transaction submission.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OffchainError;
use crate::utxo::UtxoRef;

/// Maximum number of items Blockfrost returns per page
const PAGE_SIZE: usize = 100;

/// Unit name Blockfrost uses for ADA
pub const LOVELACE_UNIT: &str = "lovelace";

// ============================================================================
// RESPONSE STRUCTURES
// ============================================================================

/// Error body returned by Blockfrost on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// One asset quantity of a UTxO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// `lovelace` or policy id + asset name hex
    pub unit: String,
    /// Quantity as a decimal string
    pub quantity: String,
}

/// Unspent output from GET /addresses/{address}/utxos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressUtxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<Amount>,
    /// Hash of the attached datum (also set for inline datums)
    #[serde(default)]
    pub data_hash: Option<String>,
    /// Inline datum CBOR hex
    #[serde(default)]
    pub inline_datum: Option<String>,
    #[serde(default)]
    pub reference_script_hash: Option<String>,
}

impl AddressUtxo {
    pub fn utxo_ref(&self) -> UtxoRef {
        UtxoRef::new(self.tx_hash.clone(), self.output_index)
    }

    /// Lovelace held by the output.
    pub fn lovelace(&self) -> u64 {
        self.amount
            .iter()
            .filter(|a| a.unit == LOVELACE_UNIT)
            .filter_map(|a| a.quantity.parse::<u64>().ok())
            .sum()
    }

    /// Whether the output holds nothing but ADA.
    pub fn is_pure_lovelace(&self) -> bool {
        self.amount.iter().all(|a| a.unit == LOVELACE_UNIT)
    }

    /// Whether the output carries a datum, inline or by hash.
    pub fn has_datum(&self) -> bool {
        self.inline_datum.is_some() || self.data_hash.is_some()
    }
}

/// Current protocol parameters (subset) from GET /epochs/latest/parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolParams {
    /// Fee per transaction byte
    pub min_fee_a: u64,
    /// Constant fee per transaction
    pub min_fee_b: u64,
    pub max_tx_size: u64,
    /// Lovelace per memory unit
    #[serde(default)]
    pub price_mem: Option<f64>,
    /// Lovelace per CPU step
    #[serde(default)]
    pub price_step: Option<f64>,
    #[serde(default)]
    pub max_tx_ex_mem: Option<String>,
    #[serde(default)]
    pub max_tx_ex_steps: Option<String>,
    #[serde(default)]
    pub collateral_percent: Option<u64>,
    /// Cost models as integer arrays keyed by `PlutusV1`/`PlutusV2`/`PlutusV3`
    #[serde(default)]
    pub cost_models_raw: Option<HashMap<String, Vec<i64>>>,
}

impl ProtocolParams {
    /// Per-transaction execution budget as (memory, steps).
    pub fn max_tx_ex_units(&self) -> (u64, u64) {
        let mem = self
            .max_tx_ex_mem
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14_000_000);
        let steps = self
            .max_tx_ex_steps
            .as_deref()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10_000_000_000);
        (mem, steps)
    }

    /// Cost model for a Plutus language key, e.g. `PlutusV2`.
    pub fn cost_model(&self, language: &str) -> Option<&[i64]> {
        self.cost_models_raw
            .as_ref()
            .and_then(|models| models.get(language))
            .map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LatestBlock {
    slot: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatumCbor {
    cbor: String,
}

/// Execution units reported for one redeemer by the evaluation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatedRedeemer {
    /// Redeemer purpose, e.g. `spend`
    pub tag: RedeemerTag,
    /// Position of the redeemed item among the sorted inputs (for spends)
    pub index: u32,
    pub memory: u64,
    pub steps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Certificate,
    Withdrawal,
}

impl RedeemerTag {
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "spend" => Some(RedeemerTag::Spend),
            "mint" => Some(RedeemerTag::Mint),
            "certificate" | "publish" => Some(RedeemerTag::Certificate),
            "withdrawal" | "withdraw" => Some(RedeemerTag::Withdrawal),
            _ => None,
        }
    }
}

// ============================================================================
// BLOCKFROST CLIENT
// ============================================================================

/// HTTP client for the Blockfrost REST API.
///
/// Uses blocking HTTP requests. Every request carries the `project_id` header.
pub struct BlockfrostClient {
    /// Base URL including the `/api/v0` suffix
    base_url: String,
    /// Blockfrost project id
    project_id: String,
    client: Client,
}

impl BlockfrostClient {
    /// Creates a new Blockfrost client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL, e.g. "https://cardano-preprod.blockfrost.io/api/v0"
    /// * `project_id` - Blockfrost project id
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists every unspent output at an address, following pagination.
    ///
    /// An address that never received funds yields 404 and is reported as empty.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<AddressUtxo>)` - All UTxOs at the address
    /// * `Err(anyhow::Error)` - Request failed
    pub fn address_utxos(&self, address: &str) -> Result<Vec<AddressUtxo>> {
        let url = format!("{}/addresses/{}/utxos", self.base_url, address);
        let mut utxos = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .client
                .get(&url)
                .header("project_id", &self.project_id)
                .query(&[("page", page.to_string())])
                .send()
                .context("Failed to send GET /addresses/:address/utxos request")?;

            if response.status() == StatusCode::NOT_FOUND {
                break;
            }

            let batch: Vec<AddressUtxo> = check_status(response)?
                .json()
                .context("Failed to parse GET /addresses/:address/utxos response")?;
            let batch_len = batch.len();
            utxos.extend(batch);

            if batch_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        debug!("Found {} UTxOs at {}", utxos.len(), address);
        Ok(utxos)
    }

    /// Slot of the latest block.
    pub fn latest_slot(&self) -> Result<u64> {
        let url = format!("{}/blocks/latest", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .context("Failed to send GET /blocks/latest request")?;

        let block: LatestBlock = check_status(response)?
            .json()
            .context("Failed to parse GET /blocks/latest response")?;

        block
            .slot
            .context("Latest block has no slot (Byron epoch boundary block)")
    }

    /// Protocol parameters of the current epoch.
    pub fn protocol_params(&self) -> Result<ProtocolParams> {
        let url = format!("{}/epochs/latest/parameters", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .context("Failed to send GET /epochs/latest/parameters request")?;

        check_status(response)?
            .json()
            .context("Failed to parse GET /epochs/latest/parameters response")
    }

    /// CBOR hex of a datum by its hash.
    pub fn datum_cbor(&self, datum_hash: &str) -> Result<String> {
        let url = format!("{}/scripts/datum/{}/cbor", self.base_url, datum_hash);
        let response = self
            .client
            .get(&url)
            .header("project_id", &self.project_id)
            .send()
            .context("Failed to send GET /scripts/datum/:hash/cbor request")?;

        let datum: DatumCbor = check_status(response)?
            .json()
            .context("Failed to parse GET /scripts/datum/:hash/cbor response")?;
        Ok(datum.cbor)
    }

    /// Evaluates the scripts of an unsigned transaction and returns the execution
    /// units of each redeemer.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<EvaluatedRedeemer>)` - Units per redeemer
    /// * `Err(anyhow::Error)` - Request failed or a script failed to validate
    pub fn evaluate_tx(&self, tx_cbor: &[u8]) -> Result<Vec<EvaluatedRedeemer>> {
        let url = format!("{}/utils/txs/evaluate", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("project_id", &self.project_id)
            .header("Content-Type", "application/cbor")
            .body(hex::encode(tx_cbor))
            .send()
            .context("Failed to send POST /utils/txs/evaluate request")?;

        let body: serde_json::Value = check_status(response)?
            .json()
            .context("Failed to parse POST /utils/txs/evaluate response")?;

        Ok(parse_evaluation(&body)?)
    }

    /// Submits a signed transaction and returns its id.
    pub fn submit_tx(&self, tx_cbor: &[u8]) -> Result<String> {
        let url = format!("{}/tx/submit", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("project_id", &self.project_id)
            .header("Content-Type", "application/cbor")
            .body(tx_cbor.to_vec())
            .send()
            .context("Failed to send POST /tx/submit request")?;

        check_status(response)?
            .json::<String>()
            .context("Failed to parse POST /tx/submit response")
    }
}

/// Converts a non-2xx response into an `Api` error, using the Blockfrost error body
/// when it can be parsed.
fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => format!("{}: {}", body.error, body.message),
        Err(_) if text.is_empty() => status.to_string(),
        Err(_) => text,
    };

    Err(OffchainError::Api {
        status: status.as_u16(),
        message,
    }
    .into())
}

/// Parses an Ogmios-style evaluation result:
/// `{"result": {"EvaluationResult": {"spend:0": {"memory": .., "steps": ..}}}}`.
pub fn parse_evaluation(body: &serde_json::Value) -> Result<Vec<EvaluatedRedeemer>, OffchainError> {
    let result = body.get("result").unwrap_or(body);

    if let Some(failure) = result.get("EvaluationFailure") {
        return Err(OffchainError::Evaluation(failure.to_string()));
    }

    let entries = result
        .get("EvaluationResult")
        .and_then(|r| r.as_object())
        .ok_or_else(|| OffchainError::Evaluation(format!("unexpected response: {}", body)))?;

    let mut redeemers = Vec::with_capacity(entries.len());
    for (pointer, units) in entries {
        let (tag, index) = pointer
            .split_once(':')
            .ok_or_else(|| OffchainError::Evaluation(format!("bad redeemer pointer {}", pointer)))?;
        let tag = RedeemerTag::parse(tag)
            .ok_or_else(|| OffchainError::Evaluation(format!("unknown redeemer tag {}", tag)))?;
        let index = index
            .parse::<u32>()
            .map_err(|_| OffchainError::Evaluation(format!("bad redeemer index {}", pointer)))?;
        let memory = units.get("memory").and_then(|v| v.as_u64());
        let steps = units.get("steps").and_then(|v| v.as_u64());
        match (memory, steps) {
            (Some(memory), Some(steps)) => redeemers.push(EvaluatedRedeemer {
                tag,
                index,
                memory,
                steps,
            }),
            _ => {
                return Err(OffchainError::Evaluation(format!(
                    "missing units for {}",
                    pointer
                )))
            }
        }
    }

    Ok(redeemers)
}

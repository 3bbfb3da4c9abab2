//! Hello-World Client
//!
//! Command-line client for the hello-world validator.
//!
//! ## Usage
//!
//! ```bash
//! export BLOCKFROST_API_KEY=preprod...
//! export HELLO_WORLD_SCRIPT_ADDRESS=addr_test1w...
//! export CARDANO_SIGNING_KEY_FILE=payment.skey
//!
//! cargo run --bin hello_world -- lock --amount 10000000 --owner-pkh <hex>
//! cargo run --bin hello_world -- unlock
//! cargo run --bin hello_world -- utxos
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use cardano_offchain::{
    contracts::hello_world::{OWNER_PKH_ENV, SCRIPT_ADDRESS_ENV},
    crypto::parse_key_hash,
    units::format_ada,
    Blueprint, ChainContext, HelloWorldContract, OffchainConfig, OffchainError, Wallet,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hello_world", author, version)]
#[command(about = "Lock and unlock funds behind the hello-world validator")]
struct Args {
    /// Path to configuration file (default: config/offchain.toml or OFFCHAIN_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lock funds at the script address
    Lock {
        /// Amount in lovelace
        #[arg(long, default_value_t = 10_000_000)]
        amount: u64,
        /// Owner payment key hash (hex); falls back to OWNER_PUBKEY_HASH
        #[arg(long)]
        owner_pkh: Option<String>,
    },
    /// Unlock the first UTxO at the script address
    Unlock,
    /// List UTxOs at the script address
    Utxos,
}

fn main() {
    if let Err(e) = run() {
        println!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = OffchainConfig::load_from_path(args.config.as_deref())?;

    // Required configuration is checked before any network call
    let ctx = ChainContext::from_config(&config)?;
    let script_address = std::env::var(SCRIPT_ADDRESS_ENV)
        .ok()
        .filter(|addr| !addr.trim().is_empty())
        .ok_or_else(|| OffchainError::MissingEnv(SCRIPT_ADDRESS_ENV.to_string()))?;

    let script = if Path::new(&config.blueprint.path).exists() {
        let blueprint = Blueprint::load(&config.blueprint.path)?;
        Some(blueprint.script(&config.blueprint.hello_world_validator)?)
    } else {
        warn!(
            "⚠️  Blueprint {} not found; unlocking is unavailable",
            config.blueprint.path
        );
        None
    };

    let contract = HelloWorldContract::new(&ctx, script_address.trim(), script)?;
    info!("Network: {}", ctx.network.as_str());
    info!("Script address: {}", contract.script_address());

    match args.command {
        Command::Lock { amount, owner_pkh } => {
            let owner = owner_pkh
                .or_else(|| std::env::var(OWNER_PKH_ENV).ok())
                .filter(|pkh| !pkh.trim().is_empty())
                .context("Owner public key hash required (--owner-pkh or OWNER_PUBKEY_HASH)")?;
            let owner = parse_key_hash(&owner)?;

            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let tx_hash = contract.lock(&wallet, amount, &owner)?;
            println!("✅ Funds locked: {}", tx_hash);
            Ok(())
        }
        Command::Unlock => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let utxos = contract.get_script_utxos()?;
            let utxo = utxos
                .first()
                .context("No UTxOs at the script address to unlock")?;
            let tx_hash = contract.unlock(&wallet, utxo)?;
            println!("✅ Funds unlocked: {}", tx_hash);
            Ok(())
        }
        Command::Utxos => {
            let utxos = contract.get_script_utxos()?;
            println!("Found {} UTxO(s) at {}", utxos.len(), contract.script_address());
            for utxo in utxos {
                println!(
                    "  {}  {}  datum={}",
                    utxo.utxo_ref(),
                    format_ada(utxo.lovelace()),
                    utxo.inline_datum.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
    }
}

//! Escrow Client
//!
//! Command-line client for the escrow validator.
//!
//! ## Usage
//!
//! ```bash
//! export BLOCKFROST_API_KEY=preprod...
//! export CARDANO_SIGNING_KEY_FILE=payment.skey
//!
//! cargo run --bin escrow -- lock --seller addr_test1... --amount 5000000
//! cargo run --bin escrow -- utxos
//! cargo run --bin escrow -- complete --utxo <tx_hash>#0
//! cargo run --bin escrow -- example
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use cardano_offchain::{
    units::{format_ada, format_deadline},
    Blueprint, ChainContext, EscrowConfig, EscrowContract, EscrowState, OffchainConfig, UtxoRef,
    Wallet,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "escrow", author, version)]
#[command(about = "Lock, complete, cancel and refund funds held by the escrow validator")]
struct Args {
    /// Path to configuration file (default: config/offchain.toml or OFFCHAIN_CONFIG_PATH env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full workflow: lock for a throw-away seller, wait, then complete
    Example,
    /// Lock funds in a new escrow
    Lock {
        /// Seller bech32 address or payment key hash (hex)
        #[arg(long)]
        seller: String,
        /// Amount in lovelace
        #[arg(long, default_value_t = 5_000_000)]
        amount: u64,
        /// Hours until the escrow deadline
        #[arg(long, default_value_t = 24)]
        deadline_hours: u64,
    },
    /// Complete an escrow, paying the seller
    Complete {
        /// Escrow UTxO as <tx_hash>#<index>
        #[arg(long)]
        utxo: UtxoRef,
    },
    /// Cancel an escrow, returning funds to the wallet
    Cancel {
        #[arg(long)]
        utxo: UtxoRef,
    },
    /// Refund an escrow to the buyer wallet
    Refund {
        #[arg(long)]
        utxo: UtxoRef,
    },
    /// List escrow UTxOs at the script address
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
    let blueprint = Blueprint::load(&config.blueprint.path)?;
    let contract =
        EscrowContract::from_blueprint(&ctx, &blueprint, &config.blueprint.escrow_validator)?;

    info!("Network: {}", ctx.network.as_str());
    info!("Escrow script address: {}", contract.script_address()?);

    match args.command {
        Command::Example => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            run_example(&ctx, &contract, &wallet)
        }
        Command::Lock {
            seller,
            amount,
            deadline_hours,
        } => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let result = contract.lock_funds(&wallet, &seller, amount, deadline_hours)?;
            println!("✅ Escrow created: {}", result.tx_hash);
            Ok(())
        }
        Command::Complete { utxo } => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let escrow = locate(&contract, &utxo)?;
            let tx_hash = contract.complete_escrow(&wallet, &utxo, &escrow)?;
            println!("✅ Escrow completed: {}", tx_hash);
            Ok(())
        }
        Command::Cancel { utxo } => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let escrow = locate(&contract, &utxo)?;
            let tx_hash = contract.cancel_escrow(&wallet, &utxo, &escrow)?;
            println!("✅ Escrow cancelled: {}", tx_hash);
            Ok(())
        }
        Command::Refund { utxo } => {
            let wallet = Wallet::from_env(&config.wallet, ctx.network)?;
            let escrow = locate(&contract, &utxo)?;
            let tx_hash = contract.refund_escrow(&wallet, &utxo, &escrow)?;
            println!("✅ Escrow refunded: {}", tx_hash);
            Ok(())
        }
        Command::Utxos => {
            let escrows = contract.find_escrow_utxos()?;
            println!("Found {} escrow UTxO(s)", escrows.len());
            for escrow in escrows {
                let state = match escrow.config.state {
                    EscrowState::Active => "active",
                    EscrowState::Completed => "completed",
                };
                println!(
                    "  {}  {}  seller={}  deadline={}  nonce={}  ({})",
                    escrow.utxo.utxo_ref(),
                    format_ada(escrow.config.amount),
                    hex::encode(escrow.config.seller),
                    format_deadline(escrow.config.deadline),
                    escrow.config.nonce,
                    state
                );
            }
            Ok(())
        }
    }
}

/// Finds the datum of an escrow UTxO at the script address.
fn locate(contract: &EscrowContract<'_>, utxo: &UtxoRef) -> Result<EscrowConfig> {
    contract
        .find_escrow_utxos()?
        .into_iter()
        .find(|escrow| &escrow.utxo.utxo_ref() == utxo)
        .map(|escrow| escrow.config)
        .with_context(|| format!("No escrow UTxO {} at the script address", utxo))
}

/// Lock 5 ADA for a throw-away seller, wait for confirmation and complete it.
fn run_example(ctx: &ChainContext, contract: &EscrowContract<'_>, wallet: &Wallet) -> Result<()> {
    info!("Buyer address: {}", wallet.address()?);

    let seller = Wallet::generate(ctx.network);
    let seller_address = seller.address()?;
    info!("Seller address (generated): {}", seller_address);

    let locked = contract.lock_funds(wallet, &seller_address, 5_000_000, 24)?;

    let wait = ctx.tx.confirmation_wait_secs;
    info!("Waiting {}s for {} to be confirmed...", wait, locked.tx_hash);
    std::thread::sleep(Duration::from_secs(wait));

    let escrow = contract
        .find_escrow_utxos()?
        .into_iter()
        .find(|escrow| escrow.utxo.tx_hash == locked.tx_hash)
        .with_context(|| {
            format!(
                "Escrow output of {} not visible yet; run `escrow complete --utxo {}#0` later",
                locked.tx_hash, locked.tx_hash
            )
        })?;

    let tx_hash = contract.complete_escrow(wallet, &escrow.utxo.utxo_ref(), &escrow.config)?;
    println!("✅ Example finished. Lock: {}  Complete: {}", locked.tx_hash, tx_hash);
    Ok(())
}

//! 'main' for the Horrocard wallet command line

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use horrocard_cardano::{AssemblerConfig, PaymentRequest, TransactionAssembler};
use horrocard_common::{Address, TxHash, format_ada};
use horrocard_module_indexer::{
    BlockfrostIndexer, ChainIndexer, Confirmation, await_confirmation,
};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, filter, fmt};

mod config;
mod key_file;
mod payment;

use crate::config::WalletConfig;

#[derive(Debug, Parser)]
#[command(name = "horrocard-wallet")]
#[command(about = "Query a Cardano address and send payments from it")]
struct Args {
    /// Configuration files, read in order
    #[arg(long, value_name = "PATH", default_values_t = vec!["horrocard-wallet.toml".to_string()])]
    config: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the latest protocol parameters
    Parameters,

    /// Print the wallet balance
    Balance,

    /// List the wallet's unspent outputs
    Utxos,

    /// List recent transactions with their effect on the wallet
    History,

    /// Build, sign and submit a payment
    Send {
        /// Receiving address
        #[arg(long)]
        to: String,

        /// ADA to send, up to six decimals
        #[arg(long)]
        ada: String,

        /// Native asset to send, as <policy hex><name hex>:<quantity>; repeatable
        #[arg(long = "asset", value_name = "UNIT:QUANTITY")]
        assets: Vec<String>,

        /// Print the signed transaction instead of submitting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Check whether a transaction is on chain
    Status {
        /// Transaction id, hex
        hash: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Standard logging using RUST_LOG for log levels, default to INFO
    let fmt_layer = fmt::layer().with_filter(
        EnvFilter::from_default_env().add_directive(filter::LevelFilter::INFO.into()),
    );
    Registry::default().with(fmt_layer).init();

    let args = Args::parse();
    let config = WalletConfig::load(&args.config)?;
    let indexer = BlockfrostIndexer::new(&config.indexer)?;

    match args.command {
        Command::Parameters => {
            let params = indexer.protocol_parameters().await?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Command::Balance => show_balance(&indexer, &config.address).await?,
        Command::Utxos => show_utxos(&indexer, &config.address).await?,
        Command::History => show_history(&indexer, &config.address).await?,
        Command::Send {
            to,
            ada,
            assets,
            dry_run,
        } => {
            let assets = assets.iter().map(|a| payment::parse_asset(a)).collect::<Result<Vec<_>>>()?;
            let value = payment::payment_value(payment::parse_ada(&ada)?, &assets)?;
            let to = Address::parse_for(&to, config.network)
                .with_context(|| format!("Receiving address {to}"))?;
            send(&indexer, &config, PaymentRequest::new(to, value), dry_run).await?;
        }
        Command::Status { hash } => {
            let hash: TxHash = hash.parse().context("Transaction id must be 64 hex digits")?;
            if indexer.transaction_status(&hash).await? {
                println!("{hash} is on chain");
            } else {
                println!("{hash} is not on chain");
            }
        }
    }

    Ok(())
}

async fn show_balance(indexer: &dyn ChainIndexer, address: &Address) -> Result<()> {
    let (balance, utxos) = tokio::try_join!(indexer.balance(address), indexer.utxos(address))?;
    let assets: usize = utxos.iter().map(|utxo| utxo.value.asset_count()).sum();
    println!("{address}");
    println!("  {} ADA in {} UTxOs, {assets} asset entries", format_ada(balance), utxos.len());
    Ok(())
}

async fn show_utxos(indexer: &dyn ChainIndexer, address: &Address) -> Result<()> {
    for utxo in indexer.utxos(address).await? {
        println!("{}  {} ADA", utxo.utxo, format_ada(utxo.value.lovelace));
        for (unit, quantity) in utxo.value.units().skip(1) {
            println!("    {quantity} {unit}");
        }
    }
    Ok(())
}

async fn show_history(indexer: &dyn ChainIndexer, address: &Address) -> Result<()> {
    for tx in indexer.transaction_history(address).await? {
        let time = DateTime::from_timestamp(tx.block_time, 0)
            .map(|time| time.to_rfc3339())
            .unwrap_or_else(|| tx.block_time.to_string());
        let sign = if tx.net_amount < 0 { "-" } else { "+" };
        println!(
            "{time}  block {}  {}  {sign}{} ADA  fee {}",
            tx.block_height,
            tx.hash,
            format_ada(tx.net_amount.unsigned_abs()),
            format_ada(tx.fee),
        );
    }
    Ok(())
}

async fn send(
    indexer: &BlockfrostIndexer,
    config: &WalletConfig,
    request: PaymentRequest,
    dry_run: bool,
) -> Result<()> {
    let key = key_file::load_signing_key(&config.key_file)?;
    if config.address.payment_key_hash() != Some(key.key_hash()) {
        bail!("Signing key does not belong to {}", config.address);
    }

    let (params, pool, tip) = tokio::try_join!(
        indexer.protocol_parameters(),
        indexer.utxos(&config.address),
        indexer.latest_slot(),
    )?;
    let ttl = tip.checked_add(config.ttl_offset).context("TTL overflows")?;

    let mut assembler = TransactionAssembler::new(
        AssemblerConfig {
            network: config.network,
            min_input_count: config.min_input_count,
            ttl: Some(ttl),
            ..AssemblerConfig::default()
        },
        StdRng::from_os_rng(),
    );
    assembler.set_parameters(params);
    let signed =
        assembler.build(&[request], pool, &HashSet::new(), &config.address, &key)?;

    let draft = signed.draft();
    println!("Transaction {}", signed.hash());
    println!(
        "  {} inputs, {} outputs, fee {} ADA, {} bytes, valid until slot {ttl}",
        draft.inputs().len(),
        draft.outputs().len(),
        format_ada(signed.fee()),
        signed.bytes().len(),
    );

    if dry_run {
        println!("{}", signed.to_hex());
        return Ok(());
    }

    let submitted = indexer.submit(signed.bytes()).await?;
    if submitted != signed.hash() {
        warn!("Indexer reported id {submitted}, expected {}", signed.hash());
    }
    info!("Waiting for {submitted} to be included");

    match await_confirmation(indexer, &submitted, config.indexer.confirmation_policy()).await? {
        Confirmation::Confirmed { .. } => println!("Confirmed"),
        Confirmation::Unconfirmed => {
            println!("Submitted but not yet confirmed; check later with `status {submitted}`")
        }
    }
    Ok(())
}

//! MP Console: operator console for provisioned markets.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mp_01_registry_store::JsonFileRegistryStore;
use mp_02_unit_factory::{SimulatedChain, SimulatedChainConfig};
use mp_console::{Console, StdinPrompt};

/// MP Console: operate a provisioned market
#[derive(Parser, Debug)]
#[command(name = "mp-console")]
#[command(about = "Operator console for markets provisioned by mp-provision")]
struct Args {
    /// Network whose registry record is opened
    #[arg(short, long, default_value = "hardhat")]
    network: String,

    /// Directory holding the `.env.<network>.json` registry files
    #[arg(long, default_value = ".")]
    deployments_dir: PathBuf,

    /// Snapshot file of the execution environment
    #[arg(long, default_value = ".mp-chain.json")]
    chain_state: PathBuf,

    /// Market to operate; asked interactively if omitted
    #[arg(short, long)]
    market: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the menu readable: only warnings unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let chain = SimulatedChain::open(SimulatedChainConfig {
        snapshot_path: Some(args.chain_state.clone()),
        ..SimulatedChainConfig::default()
    })
    .with_context(|| format!("Failed to open {}", args.chain_state.display()))?;
    let store = JsonFileRegistryStore::new(&args.deployments_dir);

    let console = Console::new(Arc::new(chain), args.network.as_str());
    let mut prompt = StdinPrompt::stdio();
    let mut session = console
        .open_session(&store, args.market.as_deref(), &mut prompt)
        .await
        .context("Failed to open a console session")?;

    console.run(&mut session, &mut prompt).await;
    Ok(())
}

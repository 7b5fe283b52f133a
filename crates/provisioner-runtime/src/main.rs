//! # Market Provisioner
//!
//! `mp-provision` runs one provisioning pass for the configured tenant and
//! prints the outcome as JSON. Exits 0 on success or when the tenant already
//! exists, 1 with the failure report otherwise.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use provisioner_runtime::{load_config, ProvisionerRuntime};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the JSON outcome
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config();
    let runtime = ProvisionerRuntime::new(config)?;
    let outcome = runtime.run().await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

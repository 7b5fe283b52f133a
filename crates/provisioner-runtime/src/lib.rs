//! # Provisioner Runtime Library
//!
//! Exposes the runtime configuration and the `ProvisionerRuntime` used by
//! the `mp-provision` binary, so both can be exercised in tests.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `MP_*` environment overrides)
//! 2. Open the execution environment, resuming its snapshot if present
//! 3. Open the registry store for the deployments directory
//! 4. Run one provisioning pass and print the outcome

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runtime;

pub use config::{load_config, ChainConfig, NetworkConfig, RuntimeConfig, StorageConfig};
pub use runtime::ProvisionerRuntime;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

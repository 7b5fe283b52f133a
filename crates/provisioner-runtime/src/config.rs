//! # Runtime Configuration
//!
//! Defaults suit a local development network. Each group can be overridden
//! from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `MP_NETWORK` | `network.name` |
//! | `MP_DEPLOYMENTS_DIR` | `storage.deployments_dir` |
//! | `MP_CHAIN_STATE` | `chain.state_path` (`none` disables the snapshot) |
//! | `MP_ACCOUNTS` | `chain.account_count` |

use std::path::PathBuf;

use mp_02_unit_factory::SimulatedChainConfig;
use mp_04_orchestrator::{DeploymentProfile, TenantProfile};
use shared_types::validate_network_id;
use tracing::{info, warn};

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Target network.
    pub network: NetworkConfig,
    /// Registry storage.
    pub storage: StorageConfig,
    /// Execution environment.
    pub chain: ChainConfig,
    /// Parameters shared by every tenant.
    pub deployment: DeploymentProfile,
    /// Tenant provisioned by this run.
    pub tenant: TenantProfile,
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network identifier; selects the registry file.
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "hardhat".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding `.env.<network>.json` registry files.
    pub deployments_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            deployments_dir: PathBuf::from("."),
        }
    }
}

/// Execution environment configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Snapshot file shared with the operator console.
    pub state_path: Option<PathBuf>,
    /// Number of deterministic accounts.
    pub account_count: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            state_path: Some(PathBuf::from(".mp-chain.json")),
            account_count: 10,
        }
    }
}

impl ChainConfig {
    /// Configuration of the simulated environment.
    #[must_use]
    pub fn simulated(&self) -> SimulatedChainConfig {
        SimulatedChainConfig {
            account_count: self.account_count,
            snapshot_path: self.state_path.clone(),
            ..SimulatedChainConfig::default()
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply overrides looked up by variable name. Invalid values are logged
/// and ignored.
pub fn apply_overrides<F>(config: &mut RuntimeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(network) = lookup("MP_NETWORK") {
        match validate_network_id(&network) {
            Ok(()) => {
                info!(network = %network, "Network selected from environment");
                config.network.name = network;
            }
            Err(e) => warn!("MP_NETWORK ignored: {}", e),
        }
    }

    if let Some(dir) = lookup("MP_DEPLOYMENTS_DIR") {
        if dir.trim().is_empty() {
            warn!("MP_DEPLOYMENTS_DIR ignored: empty path");
        } else {
            config.storage.deployments_dir = PathBuf::from(dir);
        }
    }

    if let Some(path) = lookup("MP_CHAIN_STATE") {
        config.chain.state_path = match path.trim() {
            "" | "none" => None,
            path => Some(PathBuf::from(path)),
        };
    }

    if let Some(accounts) = lookup("MP_ACCOUNTS") {
        match accounts.parse::<usize>() {
            Ok(n) if n > 0 => config.chain.account_count = n,
            _ => warn!("MP_ACCOUNTS must be a positive integer, got '{}'", accounts),
        }
    }
}

//! # Provisioner Runtime
//!
//! Wires the simulated execution environment and the JSON registry store
//! into a `ProvisioningOrchestrator` and runs a single pass.

use std::sync::Arc;

use anyhow::{Context, Result};
use mp_01_registry_store::JsonFileRegistryStore;
use mp_02_unit_factory::SimulatedChain;
use mp_04_orchestrator::{ProvisioningOrchestrator, ProvisioningOutcome};
use tracing::info;

use crate::config::RuntimeConfig;

/// The provisioner process.
pub struct ProvisionerRuntime {
    config: RuntimeConfig,
    orchestrator: ProvisioningOrchestrator<SimulatedChain, JsonFileRegistryStore>,
}

impl ProvisionerRuntime {
    /// Open the environment and the registry store.
    ///
    /// # Errors
    ///
    /// Fails if the environment snapshot cannot be read.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let chain = SimulatedChain::open(config.chain.simulated())
            .context("Failed to open the execution environment")?;
        let store = JsonFileRegistryStore::new(&config.storage.deployments_dir);
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::new(chain),
            Arc::new(store),
            config.deployment.clone(),
        );
        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Provision the configured tenant on the configured network.
    ///
    /// # Errors
    ///
    /// Any failed pass; the error carries the step and every unit obtained.
    pub async fn run(&self) -> Result<ProvisioningOutcome> {
        info!("===========================================");
        info!("  Market Provisioner v{}", crate::VERSION);
        info!("===========================================");
        info!("Network: {}", self.config.network.name);
        info!("Deployments Dir: {:?}", self.config.storage.deployments_dir);
        info!("Chain State: {:?}", self.config.chain.state_path);

        let outcome = self
            .orchestrator
            .provision(&self.config.network.name, &self.config.tenant)
            .await
            .with_context(|| {
                format!(
                    "Provisioning '{}' on '{}' failed",
                    self.config.tenant.name, self.config.network.name
                )
            })?;

        match &outcome {
            ProvisioningOutcome::Provisioned(report) => info!(
                core = %report.descriptor.units.core,
                "Market '{}' provisioned with {} confirmations",
                report.descriptor.name(),
                report.confirmations
            ),
            ProvisioningOutcome::AlreadyProvisioned { name } => {
                info!("Market '{}' already exists", name);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_01_registry_store::RegistryStore;
    use mp_04_orchestrator::{ProvisioningError, TenantProfile};
    use shared_types::RecordError;

    fn config_in(dir: &std::path::Path) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.storage.deployments_dir = dir.to_path_buf();
        config.chain.state_path = Some(dir.join("chain.json"));
        config
    }

    #[tokio::test]
    async fn test_second_run_is_already_provisioned() {
        let dir = tempfile::tempdir().unwrap();

        let first = ProvisionerRuntime::new(config_in(dir.path())).unwrap();
        let outcome = first.run().await.unwrap();
        assert!(outcome.report().is_some());
        assert!(dir.path().join(".env.hardhat.json").exists());
        assert!(dir.path().join("chain.json").exists());

        // A fresh process resumes the environment and the registry
        let second = ProvisionerRuntime::new(config_in(dir.path())).unwrap();
        let outcome = second.run().await.unwrap();
        assert!(outcome.is_already_provisioned());
    }

    #[tokio::test]
    async fn test_second_tenant_reuses_snapshot_environment() {
        let dir = tempfile::tempdir().unwrap();
        ProvisionerRuntime::new(config_in(dir.path()))
            .unwrap()
            .run()
            .await
            .unwrap();

        let mut config = config_in(dir.path());
        config.tenant = TenantProfile::named("Pool-B");
        let outcome = ProvisionerRuntime::new(config).unwrap().run().await.unwrap();
        let report = outcome.report().unwrap();
        assert!(!report.shared_created);

        let record = JsonFileRegistryStore::new(dir.path()).load("hardhat").unwrap();
        assert_eq!(
            record.tenant_names(),
            vec!["Test_StableCoin1_Pool", "Pool-B"]
        );
    }

    #[tokio::test]
    async fn test_blank_tenant_name_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.tenant = TenantProfile::named("");

        let err = ProvisionerRuntime::new(config)
            .unwrap()
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisioningError>(),
            Some(ProvisioningError::Record(RecordError::InvalidTenantName(_)))
        ));
        assert!(!dir.path().join(".env.hardhat.json").exists());
        assert!(!dir.path().join("chain.json").exists());
    }

    #[tokio::test]
    async fn test_bad_deployment_profile_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.deployment.solvency_multiplier = "ten percent".to_string();

        let err = ProvisionerRuntime::new(config)
            .unwrap()
            .run()
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProvisioningError>(),
            Some(ProvisioningError::Profile(_))
        ));
        assert!(!dir.path().join(".env.hardhat.json").exists());
    }

    #[tokio::test]
    async fn test_unsaved_record_fails_run_with_report() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the deployments directory should be
        let blocker = dir.path().join("deployments");
        std::fs::write(&blocker, "").unwrap();
        let mut config = config_in(dir.path());
        config.storage.deployments_dir = blocker;

        let err = ProvisionerRuntime::new(config)
            .unwrap()
            .run()
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Provisioning 'Test_StableCoin1_Pool' on 'hardhat' failed"));
        match err.downcast_ref::<ProvisioningError>() {
            Some(ProvisioningError::Persistence { obtained, .. }) => {
                assert_eq!(obtained.len(), 8);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_snapshot_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chain.json"), "not json").unwrap();
        assert!(ProvisionerRuntime::new(config_in(dir.path())).is_err());
    }
}

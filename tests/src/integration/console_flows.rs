//! # Console Flows
//!
//! The operator console opening markets written by a provisioning run in an
//! earlier process: the registry file and the environment snapshot are the
//! only things the two share.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use mp_01_registry_store::{JsonFileRegistryStore, RegistryStore};
    use mp_02_unit_factory::{derive_account, SimulatedChain, SimulatedChainConfig};
    use mp_04_orchestrator::{DeploymentProfile, ProvisioningOrchestrator, TenantProfile};
    use mp_console::{Console, ScriptedPrompt, StartupError};
    use shared_types::RegistryRecord;

    fn chain_config(dir: &Path) -> SimulatedChainConfig {
        SimulatedChainConfig {
            snapshot_path: Some(dir.join("chain.json")),
            ..SimulatedChainConfig::default()
        }
    }

    /// Provision Pool-A and Pool-B in a chain that is dropped afterwards.
    async fn provision_markets(dir: &Path) -> RegistryRecord {
        let chain = Arc::new(SimulatedChain::open(chain_config(dir)).unwrap());
        let orchestrator = ProvisioningOrchestrator::new(
            chain,
            Arc::new(JsonFileRegistryStore::new(dir)),
            DeploymentProfile::default(),
        );
        for name in ["Pool-A", "Pool-B"] {
            orchestrator
                .provision("devnet", &TenantProfile::named(name))
                .await
                .unwrap();
        }
        JsonFileRegistryStore::new(dir).load("devnet").unwrap()
    }

    fn console(dir: &Path) -> Console<SimulatedChain> {
        let chain = Arc::new(SimulatedChain::open(chain_config(dir)).unwrap());
        Console::new(chain, "devnet")
    }

    #[tokio::test]
    async fn test_console_operates_a_provisioned_market() {
        let dir = tempfile::tempdir().unwrap();
        let before = provision_markets(dir.path()).await;
        let store = JsonFileRegistryStore::new(dir.path());
        let console = console(dir.path());

        let mut prompt = ScriptedPrompt::new(&[
            "2",
            "List Markets",
            "Remove Market",
            "1",
            "List Markets",
            "Choose Address",
            "3",
            "Give Me Some Test Token",
            "Query My Account",
            "Exit",
        ]);
        let mut session = console
            .open_session(&store, None, &mut prompt)
            .await
            .unwrap();
        assert_eq!(session.units.tenant.descriptor.name(), "Pool-B");
        assert_eq!(session.acting, derive_account(0));

        console.run(&mut session, &mut prompt).await;

        assert!(prompt.saw("Operating 'Pool-B' on devnet"));
        assert!(prompt.saw("removal of 'Pool-A'"));
        let listings: Vec<&String> = prompt
            .transcript
            .iter()
            .filter(|line| line.starts_with("Pool-"))
            .collect();
        assert_eq!(listings.len(), 3);
        assert!(listings[2].starts_with("Pool-B"));

        assert_eq!(session.acting, derive_account(2));
        assert!(prompt.saw("You have the balance of 10000 USDT"));

        // The console never writes the registry record
        assert_eq!(store.load("devnet").unwrap(), before);
    }

    #[tokio::test]
    async fn test_console_selects_market_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let before = provision_markets(dir.path()).await;
        let store = JsonFileRegistryStore::new(dir.path());

        let mut prompt = ScriptedPrompt::new::<&str>(&[]);
        let session = console(dir.path())
            .open_session(&store, Some("Pool-A"), &mut prompt)
            .await
            .unwrap();

        let expected = before.find_tenant("Pool-A").unwrap();
        assert_eq!(session.units.tenant.descriptor, *expected);
        assert_eq!(
            session.units.tenant.core.address(),
            expected.units.core
        );
        assert!(prompt.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_console_refuses_unknown_market() {
        let dir = tempfile::tempdir().unwrap();
        provision_markets(dir.path()).await;
        let store = JsonFileRegistryStore::new(dir.path());

        let mut prompt = ScriptedPrompt::new::<&str>(&[]);
        let err = console(dir.path())
            .open_session(&store, Some("Pool-Z"), &mut prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::UnknownMarket { ref name, .. } if name == "Pool-Z"));
    }

    #[tokio::test]
    async fn test_console_without_snapshot_cannot_attach() {
        let dir = tempfile::tempdir().unwrap();
        provision_markets(dir.path()).await;
        let store = JsonFileRegistryStore::new(dir.path());

        // A fresh environment holds none of the recorded units
        let console = Console::new(Arc::new(SimulatedChain::in_memory()), "devnet");
        let mut prompt = ScriptedPrompt::new::<&str>(&[]);
        let err = console
            .open_session(&store, Some("Pool-A"), &mut prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, StartupError::Attach { .. }));
    }
}

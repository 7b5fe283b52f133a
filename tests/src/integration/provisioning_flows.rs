//! # Provisioning Flows
//!
//! Multi-pass scenarios against a JSON registry file:
//!
//! 1. First tenant on an empty network creates shared infra
//! 2. Later tenants attach to it; order is preserved
//! 3. Re-provisioning a recorded name is a no-op
//! 4. A resumed environment snapshot serves a second process
//! 5. Legacy registry files are read and rewritten in the current layout

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::Arc;

    use mp_01_registry_store::{JsonFileRegistryStore, RegistryStore};
    use mp_02_unit_factory::{InitArg, SimulatedChain, SimulatedChainConfig, UnitFactory};
    use mp_03_wiring_engine::peers_of;
    use mp_04_orchestrator::{
        DeploymentProfile, ProvisionReport, ProvisioningOrchestrator, ProvisioningOutcome,
        TenantProfile,
    };
    use shared_types::{Address, SharedUnitKind, TenantUnitKind, U256};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    type Orchestrator = ProvisioningOrchestrator<SimulatedChain, JsonFileRegistryStore>;

    fn orchestrator(chain: &Arc<SimulatedChain>, dir: &Path) -> Orchestrator {
        ProvisioningOrchestrator::new(
            Arc::clone(chain),
            Arc::new(JsonFileRegistryStore::new(dir)),
            DeploymentProfile::default(),
        )
    }

    async fn provision(orchestrator: &Orchestrator, name: &str) -> ProvisioningOutcome {
        orchestrator
            .provision("devnet", &TenantProfile::named(name))
            .await
            .unwrap()
    }

    fn report(outcome: ProvisioningOutcome) -> ProvisionReport {
        match outcome {
            ProvisioningOutcome::Provisioned(report) => report,
            other => panic!("expected a provisioned tenant, got {other:?}"),
        }
    }

    fn distinct(addresses: impl IntoIterator<Item = Address>) -> usize {
        addresses.into_iter().collect::<HashSet<_>>().len()
    }

    // =========================================================================
    // SCENARIOS
    // =========================================================================

    #[tokio::test]
    async fn test_three_pass_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());
        let orchestrator = orchestrator(&chain, dir.path());
        let store = JsonFileRegistryStore::new(dir.path());

        // Pool-A on an empty network
        let a = report(provision(&orchestrator, "Pool-A").await);
        assert!(a.shared_created);
        let shared = a.shared_infra;
        assert_eq!(distinct(shared.entries().map(|(_, address)| address)), 4);
        assert_eq!(distinct(a.descriptor.units.entries().map(|(_, address)| address)), 4);

        let after_a = store.load("devnet").unwrap();
        assert_eq!(after_a.shared_infra, Some(shared));
        assert_eq!(after_a.tenants, vec![a.descriptor.clone()]);
        // Re-loadable with identical content
        assert_eq!(store.load("devnet").unwrap(), after_a);

        // Pool-B reuses shared infra
        let b = report(provision(&orchestrator, "Pool-B").await);
        assert!(!b.shared_created);
        let after_b = store.load("devnet").unwrap();
        assert_eq!(after_b.shared_infra, Some(shared));
        assert_eq!(after_b.tenant_names(), vec!["Pool-A", "Pool-B"]);

        // Pool-A again
        let units_before = chain.unit_count();
        let outcome = provision(&orchestrator, "Pool-A").await;
        assert!(outcome.is_already_provisioned());
        assert_eq!(chain.unit_count(), units_before);
        assert_eq!(store.load("devnet").unwrap(), after_b);
    }

    #[tokio::test]
    async fn test_shared_infra_is_a_singleton() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());
        let orchestrator = orchestrator(&chain, dir.path());

        let names = ["Pool-1", "Pool-2", "Pool-3", "Pool-4", "Pool-5"];
        for name in names {
            report(provision(&orchestrator, name).await);
        }

        for kind in SharedUnitKind::ALL {
            assert_eq!(chain.units_of_kind(kind).len(), 1, "{kind} constructed twice");
        }
        for kind in TenantUnitKind::ALL {
            assert_eq!(chain.units_of_kind(kind).len(), names.len());
        }

        let record = JsonFileRegistryStore::new(dir.path()).load("devnet").unwrap();
        assert!(record.has_shared_infra());
        assert_eq!(record.tenant_names(), names.to_vec());
    }

    #[tokio::test]
    async fn test_networks_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());
        let orchestrator = orchestrator(&chain, dir.path());

        let devnet = report(provision(&orchestrator, "Pool-A").await);
        let testnet = report(
            orchestrator
                .provision("testnet", &TenantProfile::named("Pool-A"))
                .await
                .unwrap(),
        );

        assert!(testnet.shared_created);
        assert_ne!(testnet.shared_infra, devnet.shared_infra);
        assert!(dir.path().join(".env.devnet.json").exists());
        assert!(dir.path().join(".env.testnet.json").exists());
    }

    #[tokio::test]
    async fn test_recorded_units_hold_recorded_peers() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());
        let orchestrator = orchestrator(&chain, dir.path());
        report(provision(&orchestrator, "Pool-A").await);
        report(provision(&orchestrator, "Pool-B").await);

        let record = JsonFileRegistryStore::new(dir.path()).load("devnet").unwrap();
        let shared = record.shared_infra.unwrap();
        let operator = chain.operator();

        for tenant in &record.tenants {
            let units = tenant.units;
            for (kind, address) in units.entries() {
                let args = chain.unit(address).unwrap().init_args.unwrap();
                for peer in peers_of(kind) {
                    assert!(args.contains(&InitArg::from(units.address_of(*peer))));
                }
            }

            let core_args = chain.unit(units.core).unwrap().init_args.unwrap();
            assert_eq!(core_args.len(), 11);
            assert_eq!(core_args[0], InitArg::from(shared.payment_token));
            assert_eq!(core_args[1], InitArg::from(operator));
            assert_eq!(core_args[2], InitArg::from(units.certificate_issuer));
            assert_eq!(core_args[3], InitArg::from(units.policy_issuer));
            assert_eq!(core_args[4], InitArg::from(shared.payoff_model));
            assert_eq!(core_args[5], InitArg::from(units.epoch_manager));
            assert_eq!(core_args[6], InitArg::from(U256::exp10(17)));
            assert_eq!(core_args[10], InitArg::from(3u64));

            let epoch_args = chain.unit(units.epoch_manager).unwrap().init_args.unwrap();
            assert_eq!(
                epoch_args,
                vec![
                    InitArg::from(units.core),
                    InitArg::from(units.certificate_issuer),
                    InitArg::from(units.policy_issuer),
                    InitArg::from(operator),
                ]
            );
        }
    }

    #[tokio::test]
    async fn test_second_process_resumes_environment_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimulatedChainConfig {
            snapshot_path: Some(dir.path().join("chain.json")),
            ..SimulatedChainConfig::default()
        };

        let first_chain = Arc::new(SimulatedChain::open(config.clone()).unwrap());
        let a = report(provision(&orchestrator(&first_chain, dir.path()), "Pool-A").await);
        drop(first_chain);

        let second_chain = Arc::new(SimulatedChain::open(config).unwrap());
        assert_eq!(second_chain.unit_count(), 8);
        let b = report(provision(&orchestrator(&second_chain, dir.path()), "Pool-B").await);

        assert!(!b.shared_created);
        assert_eq!(b.shared_infra, a.shared_infra);
        assert_eq!(second_chain.unit_count(), 12);
    }

    #[tokio::test]
    async fn test_legacy_file_is_attached_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());

        // Produce real units, then describe them in the legacy layout
        let scratch = tempfile::tempdir().unwrap();
        let a = report(provision(&orchestrator(&chain, scratch.path()), "Pool-A").await);
        let shared = a.shared_infra;
        let mut market = serde_json::to_value(&a.descriptor).unwrap();
        market["marketName"] = serde_json::json!("Legacy-Pool");
        let legacy = serde_json::json!({
            "metaDefenderMarketsRegistry": shared.registry,
            "globalsViewer": shared.globals_viewer,
            "americanBinaryOptions": shared.payoff_model,
            "testERC20": shared.payment_token,
            "markets": [market],
        });
        std::fs::write(
            dir.path().join(".env.devnet.json"),
            serde_json::to_string_pretty(&legacy).unwrap(),
        )
        .unwrap();

        let b = report(provision(&orchestrator(&chain, dir.path()), "Pool-B").await);
        assert!(!b.shared_created);
        assert_eq!(b.shared_infra, shared);

        let text = std::fs::read_to_string(dir.path().join(".env.devnet.json")).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(saved.get("sharedInfra").is_some());
        assert!(saved.get("metaDefenderMarketsRegistry").is_none());
        assert_eq!(saved["tenants"][0]["marketName"], "Legacy-Pool");
        assert_eq!(saved["tenants"][1]["marketName"], "Pool-B");
    }
}

//! # Failure Flows
//!
//! A pass that fails at any environment step must leave the registry file
//! exactly as it was: a tenant is either fully recorded or absent.

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use mp_01_registry_store::{JsonFileRegistryStore, RegistryStore};
    use mp_02_unit_factory::{FaultRule, SimulatedChain, TenantRegistryUnit, UnitHandle};
    use mp_04_orchestrator::{
        DeploymentProfile, ProvisioningError, ProvisioningOrchestrator, TenantProfile,
    };
    use shared_types::{RegistryRecord, SharedUnitKind, TenantUnitKind};

    type Orchestrator = ProvisioningOrchestrator<SimulatedChain, JsonFileRegistryStore>;

    struct Fixture {
        dir: tempfile::TempDir,
        chain: Arc<SimulatedChain>,
        store: JsonFileRegistryStore,
        orchestrator: Orchestrator,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let chain = Arc::new(SimulatedChain::in_memory());
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::clone(&chain),
            Arc::new(JsonFileRegistryStore::new(dir.path())),
            DeploymentProfile::default(),
        );
        let store = JsonFileRegistryStore::new(dir.path());
        Fixture {
            dir,
            chain,
            store,
            orchestrator,
        }
    }

    /// Fixture with Pool-A already recorded.
    async fn with_first_tenant() -> (Fixture, RegistryRecord) {
        let fx = fixture();
        fx.orchestrator
            .provision("devnet", &TenantProfile::named("Pool-A"))
            .await
            .unwrap();
        let record = fx.store.load("devnet").unwrap();
        (fx, record)
    }

    async fn provision_b(fx: &Fixture) -> Result<(), ProvisioningError> {
        fx.orchestrator
            .provision("devnet", &TenantProfile::named("Pool-B"))
            .await
            .map(|_| ())
    }

    fn file_exists(dir: &Path) -> bool {
        dir.join(".env.devnet.json").exists()
    }

    // =========================================================================
    // ATOMIC TENANT VISIBILITY
    // =========================================================================

    #[tokio::test]
    async fn test_construct_fault_leaves_record_untouched() {
        for (index, kind) in TenantUnitKind::ALL.into_iter().enumerate() {
            let (fx, before) = with_first_tenant().await;
            fx.chain.inject_fault(FaultRule::construct(kind));

            let err = provision_b(&fx).await.unwrap_err();
            match &err {
                ProvisioningError::Factory { step, obtained, .. } => {
                    assert_eq!(step, &format!("construct {}", kind.label()));
                    assert_eq!(obtained.created().count(), index);
                }
                other => panic!("unexpected error for {kind}: {other}"),
            }
            assert_eq!(fx.store.load("devnet").unwrap(), before);
        }
    }

    #[tokio::test]
    async fn test_init_fault_leaves_record_untouched() {
        for kind in TenantUnitKind::ALL {
            let (fx, before) = with_first_tenant().await;
            fx.chain.inject_fault(FaultRule::init(kind));

            let err = provision_b(&fx).await.unwrap_err();
            match &err {
                ProvisioningError::Factory { step, obtained, .. } => {
                    assert_eq!(step, &format!("init {}", kind.label()));
                    assert_eq!(obtained.created().count(), 4);
                }
                other => panic!("unexpected error for {kind}: {other}"),
            }
            assert_eq!(fx.store.load("devnet").unwrap(), before);
        }
    }

    #[tokio::test]
    async fn test_registration_fault_leaves_record_untouched() {
        let (fx, before) = with_first_tenant().await;
        fx.chain.inject_fault(FaultRule::add_tenant());

        let err = provision_b(&fx).await.unwrap_err();
        assert!(matches!(err, ProvisioningError::Registration { ref tenant, .. } if tenant == "Pool-B"));
        assert_eq!(fx.store.load("devnet").unwrap(), before);

        let shared = before.shared_infra.unwrap();
        let registry = UnitHandle::bind(SharedUnitKind::TenantRegistry, shared.registry);
        let listing = fx.chain.list_tenants(&registry).await.unwrap();
        assert_eq!(listing.len(), 1);
    }

    #[tokio::test]
    async fn test_shared_infra_fault_writes_nothing() {
        for kind in SharedUnitKind::ALL {
            let fx = fixture();
            fx.chain.inject_fault(FaultRule::construct(kind));

            let err = provision_b(&fx).await.unwrap_err();
            assert!(matches!(err, ProvisioningError::Factory { .. }), "{kind}: {err}");
            assert!(!file_exists(fx.dir.path()));
            let record = fx.store.load("devnet").unwrap();
            assert!(!record.has_shared_infra());
            assert!(record.tenants.is_empty());
        }
    }

    #[tokio::test]
    async fn test_retry_after_failure_records_tenant_once() {
        let (fx, _) = with_first_tenant().await;
        fx.chain.inject_fault(FaultRule::init(TenantUnitKind::PolicyIssuer));
        assert!(provision_b(&fx).await.is_err());

        provision_b(&fx).await.unwrap();
        let record = fx.store.load("devnet").unwrap();
        assert_eq!(record.tenant_names(), vec!["Pool-A", "Pool-B"]);
        // The failed attempt's units are orphaned, not recorded
        assert_eq!(fx.chain.units_of_kind(TenantUnitKind::Core).len(), 3);
    }

    // =========================================================================
    // NAME UNIQUENESS
    // =========================================================================

    #[tokio::test]
    async fn test_recorded_name_never_reaches_environment() {
        let (fx, before) = with_first_tenant().await;
        fx.chain.inject_fault(FaultRule::construct(TenantUnitKind::Core));
        let block = fx.chain.block_number();

        let outcome = fx
            .orchestrator
            .provision("devnet", &TenantProfile::named("Pool-A"))
            .await
            .unwrap();

        assert!(outcome.is_already_provisioned());
        assert_eq!(fx.chain.pending_faults(), 1);
        assert_eq!(fx.chain.block_number(), block);
        assert_eq!(fx.store.load("devnet").unwrap(), before);
    }
}

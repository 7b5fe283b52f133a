//! # Provisioning Orchestrator Service
//!
//! One pass provisions one tenant on one network:
//!
//! 1. Load the registry record and stop early if the tenant name is taken.
//! 2. Attach the recorded shared units, or construct them if the network
//!    has none yet (plus the operator mint and the globals viewer init).
//! 3. Construct the four tenant units, then wire them.
//! 4. Register the tenant with the shared registry unit.
//! 5. Append the tenant to the record and save it, once.
//!
//! Every environment call is awaited before the next one is issued. The
//! record is only written at the end of a fully successful pass.

use std::sync::Arc;

use mp_01_registry_store::RegistryStore;
use mp_02_unit_factory::{FactoryError, InitArg, UnitHandle};
use mp_03_wiring_engine::{SharedRefs, WiringEngine, WiringError};
use shared_types::{
    validate_tenant_name, Address, RegistryRecord, SharedInfra, SharedUnitKind,
    TenantDescriptor, U256,
};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::domain::{
    DeploymentProfile, ObtainedUnits, ProvisionReport, ProvisioningError, ProvisioningOutcome,
    ProvisioningState, TenantProfile,
};
use crate::ports::UnitBackend;

/// Progress of the pass in flight.
#[derive(Debug)]
struct Pass {
    state: ProvisioningState,
    obtained: ObtainedUnits,
    confirmations: usize,
}

impl Pass {
    fn new() -> Self {
        Self {
            state: ProvisioningState::Start,
            obtained: ObtainedUnits::default(),
            confirmations: 0,
        }
    }

    fn advance(&mut self, next: ProvisioningState) -> Result<(), ProvisioningError> {
        self.state = self.state.transition(next)?;
        info!(
            state = %next,
            units = self.obtained.len(),
            "[mp-04] Pass reached {next}"
        );
        Ok(())
    }

    fn failure(&self, step: String, source: FactoryError) -> ProvisioningError {
        error!(
            state = %self.state,
            step = %step,
            error = %source,
            "[mp-04] Pass failed, record left untouched. Units obtained: {}",
            self.obtained
        );
        ProvisioningError::Factory {
            step,
            obtained: self.obtained.clone(),
            source,
        }
    }

    fn wiring_failure(&mut self, err: WiringError) -> ProvisioningError {
        match err {
            WiringError::Construct {
                kind,
                constructed,
                source,
            } => {
                for (kind, address) in constructed {
                    self.obtained.push(kind, address, true);
                }
                self.failure(format!("construct {kind}"), source)
            }
            WiringError::Init { kind, source, .. } => self.failure(format!("init {kind}"), source),
            source => {
                error!(
                    state = %self.state,
                    error = %source,
                    "[mp-04] Wiring refused. Units obtained: {}",
                    self.obtained
                );
                ProvisioningError::Wiring {
                    obtained: self.obtained.clone(),
                    source,
                }
            }
        }
    }
}

/// Shared units resolved for the pass.
struct SharedHandles {
    infra: SharedInfra,
    registry: UnitHandle,
}

/// Provisioning orchestrator.
///
/// Generic over the execution environment and the registry store so tests
/// can run whole passes against `SimulatedChain` and `InMemoryRegistryStore`.
pub struct ProvisioningOrchestrator<B, S>
where
    B: UnitBackend + ?Sized,
    S: RegistryStore + ?Sized,
{
    backend: Arc<B>,
    store: Arc<S>,
    profile: DeploymentProfile,
    wiring: WiringEngine<B>,
}

impl<B, S> ProvisioningOrchestrator<B, S>
where
    B: UnitBackend + ?Sized,
    S: RegistryStore + ?Sized,
{
    /// Create an orchestrator.
    pub fn new(backend: Arc<B>, store: Arc<S>, profile: DeploymentProfile) -> Self {
        let wiring = WiringEngine::new(Arc::clone(&backend));
        Self {
            backend,
            store,
            profile,
            wiring,
        }
    }

    /// Deployment profile applied to every pass.
    #[must_use]
    pub fn profile(&self) -> &DeploymentProfile {
        &self.profile
    }

    /// Provision `tenant` on `network`: load, run one pass, save.
    ///
    /// # Returns
    ///
    /// * `Provisioned` with the report after the record was saved
    /// * `AlreadyProvisioned` if the name was taken; nothing was called or saved
    ///
    /// # Errors
    ///
    /// Any `ProvisioningError`. The record is saved only on success.
    pub async fn provision(
        &self,
        network: &str,
        tenant: &TenantProfile,
    ) -> Result<ProvisioningOutcome, ProvisioningError> {
        let span = info_span!(
            "provisioning_pass",
            pass_id = %Uuid::new_v4(),
            network = %network,
            tenant = %tenant.name
        );
        self.provision_inner(network, tenant).instrument(span).await
    }

    /// Run one pass against `record` without touching the store.
    ///
    /// # Returns
    ///
    /// The updated record (unchanged for `AlreadyProvisioned`) and the outcome.
    ///
    /// # Errors
    ///
    /// Same as `provision`, minus `Load` and `Persistence`.
    pub async fn run_pass(
        &self,
        record: RegistryRecord,
        tenant: &TenantProfile,
    ) -> Result<(RegistryRecord, ProvisioningOutcome), ProvisioningError> {
        let span = info_span!(
            "provisioning_pass",
            pass_id = %Uuid::new_v4(),
            network = %record.network,
            tenant = %tenant.name
        );
        let mut pass = Pass::new();
        self.execute(record, tenant, &mut pass)
            .instrument(span)
            .await
    }

    async fn provision_inner(
        &self,
        network: &str,
        tenant: &TenantProfile,
    ) -> Result<ProvisioningOutcome, ProvisioningError> {
        let record = self.store.load(network).map_err(|source| {
            error!(error = %source, "[mp-04] Could not load registry record");
            ProvisioningError::Load {
                network: network.to_string(),
                source,
            }
        })?;

        let mut pass = Pass::new();
        let (record, outcome) = self.execute(record, tenant, &mut pass).await?;
        let mut report = match outcome {
            ProvisioningOutcome::Provisioned(report) => report,
            already @ ProvisioningOutcome::AlreadyProvisioned { .. } => return Ok(already),
        };

        if let Err(source) = self.store.save(&record) {
            error!(
                error = %source,
                "[mp-04] Tenant '{}' is live and registered but the record was not saved. \
                 Recover manually with: {}",
                tenant.name,
                pass.obtained
            );
            return Err(ProvisioningError::Persistence {
                tenant: tenant.name.clone(),
                obtained: pass.obtained,
                source,
            });
        }
        pass.advance(ProvisioningState::Persisted)?;
        report.state = pass.state;

        info!(
            core = %report.descriptor.units.core,
            shared_created = report.shared_created,
            confirmations = report.confirmations,
            "[mp-04] Tenant '{}' provisioned",
            tenant.name
        );
        Ok(ProvisioningOutcome::Provisioned(report))
    }

    async fn execute(
        &self,
        mut record: RegistryRecord,
        tenant: &TenantProfile,
        pass: &mut Pass,
    ) -> Result<(RegistryRecord, ProvisioningOutcome), ProvisioningError> {
        let metadata = tenant.metadata();

        // Name check precedes every environment call.
        validate_tenant_name(&metadata.name)?;
        if record.contains_tenant(&metadata.name) {
            info!("[mp-04] Tenant '{}' already exists, nothing to do", metadata.name);
            return Ok((
                record,
                ProvisioningOutcome::AlreadyProvisioned {
                    name: metadata.name,
                },
            ));
        }
        record.validate()?;
        let params = self.profile.core_params()?;
        let initial_mint = self.profile.initial_mint_amount()?;
        let operator = self.backend.operator();

        // Start -> SharedInfraResolved
        let (shared, shared_created) = match &record.shared_infra {
            Some(infra) => (self.attach_shared(infra, pass).await?, false),
            None => (self.create_shared(operator, initial_mint, pass).await?, true),
        };
        pass.advance(ProvisioningState::SharedInfraResolved)?;

        // SharedInfraResolved -> TenantConstructed
        let mut arena = self
            .wiring
            .construct_all(&tenant.issuer_tokens())
            .await
            .map_err(|err| pass.wiring_failure(err))?;
        for (kind, address) in arena.constructed() {
            pass.obtained.push(kind, address, true);
            pass.confirmations += 1;
        }
        pass.advance(ProvisioningState::TenantConstructed)?;

        // TenantConstructed -> TenantWired
        let refs = SharedRefs {
            payment_token: shared.infra.payment_token,
            payoff_model: shared.infra.payoff_model,
            operator,
        };
        let wired = self.wiring.wire_all(&mut arena, &refs, &params).await;
        pass.confirmations += arena.wired_kinds().len();
        wired.map_err(|err| pass.wiring_failure(err))?;
        pass.advance(ProvisioningState::TenantWired)?;

        // TenantWired -> TenantRegistered
        let units = arena
            .tenant_units()
            .map_err(|err| pass.wiring_failure(err))?;
        debug!(registry = %shared.registry.address(), "[mp-04] Registering tenant");
        if let Err(source) = self
            .backend
            .add_tenant(operator, &shared.registry, &units, &metadata)
            .await
        {
            error!(
                error = %source,
                "[mp-04] Registration failed, tenant units are orphaned. Units obtained: {}",
                pass.obtained
            );
            return Err(ProvisioningError::Registration {
                tenant: metadata.name,
                units,
                obtained: pass.obtained.clone(),
                source,
            });
        }
        pass.confirmations += 1;
        pass.advance(ProvisioningState::TenantRegistered)?;

        if shared_created {
            record.shared_infra = Some(shared.infra);
        }
        let descriptor = TenantDescriptor { metadata, units };
        record.append_tenant(descriptor.clone())?;

        let report = ProvisionReport {
            network: record.network.clone(),
            descriptor,
            shared_infra: shared.infra,
            shared_created,
            confirmations: pass.confirmations,
            state: pass.state,
        };
        Ok((record, ProvisioningOutcome::Provisioned(report)))
    }

    async fn attach_shared(
        &self,
        infra: &SharedInfra,
        pass: &mut Pass,
    ) -> Result<SharedHandles, ProvisioningError> {
        let registry = self
            .attach_one(SharedUnitKind::TenantRegistry, infra.registry, pass)
            .await?;
        self.attach_one(SharedUnitKind::GlobalsViewer, infra.globals_viewer, pass)
            .await?;
        self.attach_one(SharedUnitKind::PayoffModel, infra.payoff_model, pass)
            .await?;
        self.attach_one(SharedUnitKind::PaymentToken, infra.payment_token, pass)
            .await?;

        info!("[mp-04] Reusing shared infrastructure");
        Ok(SharedHandles {
            infra: *infra,
            registry,
        })
    }

    async fn create_shared(
        &self,
        operator: Address,
        initial_mint: U256,
        pass: &mut Pass,
    ) -> Result<SharedHandles, ProvisioningError> {
        info!("[mp-04] No shared infrastructure on this network, creating it");

        let registry = self
            .construct_one(SharedUnitKind::TenantRegistry, Vec::new(), pass)
            .await?;
        let globals_viewer = self
            .construct_one(SharedUnitKind::GlobalsViewer, Vec::new(), pass)
            .await?;
        let payoff_model = self
            .construct_one(SharedUnitKind::PayoffModel, Vec::new(), pass)
            .await?;

        debug!("[mp-04] Initializing globals viewer");
        self.backend
            .init(
                &globals_viewer,
                vec![
                    InitArg::from(registry.address()),
                    InitArg::from(payoff_model.address()),
                ],
            )
            .await
            .map_err(|source| pass.failure(format!("init {}", SharedUnitKind::GlobalsViewer), source))?;
        pass.confirmations += 1;

        let token_args = vec![
            InitArg::from(self.profile.payment_token_name.as_str()),
            InitArg::from(self.profile.payment_token_symbol.as_str()),
        ];
        let payment_token = self
            .construct_one(SharedUnitKind::PaymentToken, token_args, pass)
            .await?;

        debug!(to = %operator, amount = %initial_mint, "[mp-04] Minting initial supply");
        self.backend
            .mint(operator, &payment_token, operator, initial_mint)
            .await
            .map_err(|source| pass.failure(format!("mint {}", SharedUnitKind::PaymentToken), source))?;
        pass.confirmations += 1;

        Ok(SharedHandles {
            infra: SharedInfra {
                registry: registry.address(),
                globals_viewer: globals_viewer.address(),
                payment_token: payment_token.address(),
                payoff_model: payoff_model.address(),
            },
            registry,
        })
    }

    async fn construct_one(
        &self,
        kind: SharedUnitKind,
        args: Vec<InitArg>,
        pass: &mut Pass,
    ) -> Result<UnitHandle, ProvisioningError> {
        debug!(unit = %kind, artifact = kind.artifact(), "[mp-04] Constructing shared unit");
        let (address, handle) = self
            .backend
            .construct(kind.into(), args)
            .await
            .map_err(|source| pass.failure(format!("construct {kind}"), source))?;
        pass.obtained.push(kind, address, true);
        pass.confirmations += 1;
        Ok(handle)
    }

    async fn attach_one(
        &self,
        kind: SharedUnitKind,
        address: Address,
        pass: &mut Pass,
    ) -> Result<UnitHandle, ProvisioningError> {
        debug!(unit = %kind, address = %address, "[mp-04] Attaching shared unit");
        let handle = self
            .backend
            .attach(kind.into(), address)
            .await
            .map_err(|source| pass.failure(format!("attach {kind}"), source))?;
        pass.obtained.push(kind, address, false);
        Ok(handle)
    }
}

//! # Wiring Engine Service
//!
//! Drives the two phases against a `UnitFactory`:
//!
//! 1. **Construct**: all four per-tenant units, no cross-references.
//! 2. **Wire**: one init per unit, with peer addresses from the arena.
//!
//! Calls are issued one at a time; each is awaited before the next.

use std::sync::Arc;

use mp_02_unit_factory::UnitFactory;
use shared_types::TenantUnitKind;
use tracing::{debug, error, info};

use crate::domain::{
    CoreParams, InitCall, IssuerTokens, SharedRefs, UnitArena, WiringError, WiringPlan,
};

/// Construct-then-wire driver for one tenant's units.
pub struct WiringEngine<F: UnitFactory + ?Sized> {
    factory: Arc<F>,
}

impl<F: UnitFactory + ?Sized> WiringEngine<F> {
    /// Create an engine over `factory`.
    pub fn new(factory: Arc<F>) -> Self {
        Self { factory }
    }

    /// Construct phase: one unit per per-tenant kind.
    ///
    /// # Errors
    ///
    /// `Construct` with the units constructed so far if the factory fails.
    pub async fn construct_all(&self, tokens: &IssuerTokens) -> Result<UnitArena, WiringError> {
        let mut arena = UnitArena::new();

        for kind in TenantUnitKind::ALL {
            let (address, handle) = self
                .factory
                .construct(kind.into(), tokens.constructor_args(kind))
                .await
                .map_err(|source| {
                    error!(unit = %kind, error = %source, "[mp-03] Construct failed");
                    WiringError::Construct {
                        kind,
                        constructed: arena.constructed(),
                        source,
                    }
                })?;
            arena.insert(handle)?;
            debug!(unit = %kind, address = %address, "[mp-03] Constructed");
        }

        info!(units = arena.constructed().len(), "[mp-03] Construct phase complete");
        Ok(arena)
    }

    /// Wire phase: build the plan for `arena` and dispatch it in order.
    ///
    /// # Errors
    ///
    /// - `MissingPeer` / `Incomplete` if the arena is not complete
    /// - `Init` if the factory fails, with the units wired so far
    pub async fn wire_all(
        &self,
        arena: &mut UnitArena,
        shared: &SharedRefs,
        params: &CoreParams,
    ) -> Result<(), WiringError> {
        let plan = WiringPlan::build(arena, shared, params)?;
        self.dispatch(arena, plan.into_calls()).await?;

        info!("[mp-03] Wire phase complete");
        Ok(())
    }

    /// Dispatch init calls in the given order.
    ///
    /// Any order is valid: every call only carries peer addresses. A unit
    /// already wired in this pass is refused before reaching the factory.
    ///
    /// # Errors
    ///
    /// - `AlreadyWired` for a second call to the same unit
    /// - `Init` if the factory fails
    pub async fn dispatch(
        &self,
        arena: &mut UnitArena,
        calls: Vec<InitCall>,
    ) -> Result<(), WiringError> {
        for InitCall { kind, args } in calls {
            if arena.is_wired(kind) {
                return Err(WiringError::AlreadyWired(kind));
            }
            let handle = *arena
                .get(kind)
                .ok_or(WiringError::Incomplete {
                    missing: vec![kind],
                })?
                .handle();

            let confirmation = self.factory.init(&handle, args).await.map_err(|source| {
                error!(unit = %kind, error = %source, "[mp-03] Init failed");
                WiringError::Init {
                    kind,
                    wired: arena.wired_kinds(),
                    source,
                }
            })?;
            arena.mark_wired(kind, confirmation)?;

            debug!(
                unit = %kind,
                address = %handle.address(),
                block = confirmation.block_number,
                "[mp-03] Wired"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mp_02_unit_factory::{FactoryError, FaultRule, InitArg, SimulatedChain};
    use shared_types::{Address, SharedUnitKind, U256};

    fn tokens() -> IssuerTokens {
        IssuerTokens {
            certificate_name: "L_231007_LC".to_string(),
            certificate_symbol: "L_231007_LC".to_string(),
            policy_name: "L_231007_P".to_string(),
            policy_symbol: "L_231007_P".to_string(),
        }
    }

    fn params() -> CoreParams {
        CoreParams {
            fee_rate: U256::exp10(17),
            fee_floor: U256::zero(),
            coverage_multiplier: U256::from(200) * U256::exp10(18),
            solvency_multiplier: U256::from(11) * U256::exp10(17),
            epoch_count: 3,
        }
    }

    fn shared(chain: &SimulatedChain) -> SharedRefs {
        SharedRefs {
            payment_token: Address::new([0xa1; 20]),
            payoff_model: Address::new([0xa2; 20]),
            operator: chain.operator(),
        }
    }

    fn engine(chain: &Arc<SimulatedChain>) -> WiringEngine<SimulatedChain> {
        WiringEngine::new(Arc::clone(chain))
    }

    #[tokio::test]
    async fn test_construct_then_wire() {
        let chain = Arc::new(SimulatedChain::in_memory());
        let engine = engine(&chain);

        let mut arena = engine.construct_all(&tokens()).await.unwrap();
        assert!(arena.is_complete());
        for (_, address) in arena.constructed() {
            assert!(!chain.unit(address).unwrap().is_initialized());
        }

        engine
            .wire_all(&mut arena, &shared(&chain), &params())
            .await
            .unwrap();
        assert!(arena.is_fully_wired());

        let units = arena.tenant_units().unwrap();
        let cert = chain.unit(units.certificate_issuer).unwrap();
        assert_eq!(cert.init_args, Some(vec![InitArg::from(units.core)]));
        assert_eq!(
            cert.constructor_args,
            vec![InitArg::from("L_231007_LC"), InitArg::from("L_231007_LC")]
        );

        let epoch = chain.unit(units.epoch_manager).unwrap();
        assert_eq!(
            epoch.init_args,
            Some(vec![
                InitArg::from(units.core),
                InitArg::from(units.certificate_issuer),
                InitArg::from(units.policy_issuer),
                InitArg::from(chain.operator()),
            ])
        );
    }

    #[tokio::test]
    async fn test_wire_order_does_not_matter() {
        let chain = Arc::new(SimulatedChain::in_memory());
        let engine = engine(&chain);
        let mut arena = engine.construct_all(&tokens()).await.unwrap();

        let mut calls = WiringPlan::build(&arena, &shared(&chain), &params())
            .unwrap()
            .into_calls();
        calls.reverse();
        engine.dispatch(&mut arena, calls).await.unwrap();

        assert!(arena.is_fully_wired());
    }

    #[tokio::test]
    async fn test_second_init_refused_before_factory() {
        let chain = Arc::new(SimulatedChain::in_memory());
        let engine = engine(&chain);
        let mut arena = engine.construct_all(&tokens()).await.unwrap();
        engine
            .wire_all(&mut arena, &shared(&chain), &params())
            .await
            .unwrap();
        let block = chain.block_number();

        let again = engine
            .wire_all(&mut arena, &shared(&chain), &params())
            .await;
        assert_eq!(again, Err(WiringError::AlreadyWired(TenantUnitKind::Core)));
        assert_eq!(chain.block_number(), block);
    }

    #[tokio::test]
    async fn test_construct_failure_reports_constructed_units() {
        let chain = Arc::new(SimulatedChain::in_memory());
        chain.inject_fault(FaultRule::construct(TenantUnitKind::PolicyIssuer));

        let result = engine(&chain).construct_all(&tokens()).await;
        match result {
            Err(WiringError::Construct {
                kind,
                constructed,
                source,
            }) => {
                assert_eq!(kind, TenantUnitKind::PolicyIssuer);
                assert_eq!(constructed.len(), 2);
                assert!(matches!(source, FactoryError::Rejected { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(chain.unit_count(), 2);
    }

    #[tokio::test]
    async fn test_init_failure_reports_wired_units() {
        let chain = Arc::new(SimulatedChain::in_memory());
        let engine = engine(&chain);
        let mut arena = engine.construct_all(&tokens()).await.unwrap();
        chain.inject_fault(FaultRule::init(TenantUnitKind::EpochManager));

        let result = engine
            .wire_all(&mut arena, &shared(&chain), &params())
            .await;
        match result {
            Err(WiringError::Init { kind, wired, .. }) => {
                assert_eq!(kind, TenantUnitKind::EpochManager);
                assert_eq!(wired.len(), 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!arena.is_wired(TenantUnitKind::EpochManager));
    }

    #[tokio::test]
    async fn test_shared_handle_cannot_enter_arena() {
        let chain = Arc::new(SimulatedChain::in_memory());
        let (_, handle) = chain
            .construct(SharedUnitKind::PayoffModel.into(), vec![])
            .await
            .unwrap();
        let mut arena = UnitArena::new();
        assert_eq!(
            arena.insert(handle),
            Err(WiringError::SharedUnit(SharedUnitKind::PayoffModel))
        );
    }
}

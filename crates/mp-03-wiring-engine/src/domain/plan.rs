//! # Wiring Plan
//!
//! Turns a complete arena plus shared references and core parameters into
//! the four init calls of a tenant. Building the plan needs only addresses,
//! so the calls carry no ordering constraint between them.

use mp_02_unit_factory::InitArg;
use serde::{Deserialize, Serialize};
use shared_types::{Address, TenantUnitKind, U256};

use super::arena::UnitArena;
use super::errors::WiringError;

/// Numeric parameters of the core unit's init, in 18-decimal base units
/// except `epoch_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreParams {
    /// Fee rate.
    pub fee_rate: U256,
    /// Lower bound of the fee.
    pub fee_floor: U256,
    /// Coverage multiplier.
    pub coverage_multiplier: U256,
    /// Solvency multiplier.
    pub solvency_multiplier: U256,
    /// Number of epochs.
    pub epoch_count: u64,
}

/// Shared addresses the per-tenant inits refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedRefs {
    /// Payment token unit.
    pub payment_token: Address,
    /// Payoff model unit.
    pub payoff_model: Address,
    /// Operating identity.
    pub operator: Address,
}

/// Constructor arguments of the two issuer units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerTokens {
    /// Certificate token name.
    pub certificate_name: String,
    /// Certificate token symbol.
    pub certificate_symbol: String,
    /// Policy token name.
    pub policy_name: String,
    /// Policy token symbol.
    pub policy_symbol: String,
}

impl IssuerTokens {
    /// Constructor arguments for `kind`.
    #[must_use]
    pub fn constructor_args(&self, kind: TenantUnitKind) -> Vec<InitArg> {
        match kind {
            TenantUnitKind::CertificateIssuer => vec![
                self.certificate_name.as_str().into(),
                self.certificate_symbol.as_str().into(),
            ],
            TenantUnitKind::PolicyIssuer => vec![
                self.policy_name.as_str().into(),
                self.policy_symbol.as_str().into(),
            ],
            TenantUnitKind::Core | TenantUnitKind::EpochManager => Vec::new(),
        }
    }
}

/// One init call of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitCall {
    /// Unit to wire.
    pub kind: TenantUnitKind,
    /// Arguments, in the unit's parameter order.
    pub args: Vec<InitArg>,
}

/// The init calls of one tenant, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringPlan {
    calls: Vec<InitCall>,
}

impl WiringPlan {
    /// Build the plan for a complete arena.
    ///
    /// # Errors
    ///
    /// `MissingPeer` if a referenced unit has not been constructed.
    pub fn build(
        arena: &UnitArena,
        shared: &SharedRefs,
        params: &CoreParams,
    ) -> Result<Self, WiringError> {
        let calls = TenantUnitKind::ALL
            .into_iter()
            .map(|kind| {
                let peer = |peer: TenantUnitKind| -> Result<InitArg, WiringError> {
                    arena
                        .address_of(peer)
                        .map(InitArg::Address)
                        .ok_or(WiringError::MissingPeer { unit: kind, peer })
                };
                if arena.address_of(kind).is_none() {
                    return Err(WiringError::Incomplete {
                        missing: arena.missing(),
                    });
                }

                let args = match kind {
                    TenantUnitKind::Core => vec![
                        shared.payment_token.into(),
                        shared.operator.into(),
                        peer(TenantUnitKind::CertificateIssuer)?,
                        peer(TenantUnitKind::PolicyIssuer)?,
                        shared.payoff_model.into(),
                        peer(TenantUnitKind::EpochManager)?,
                        params.fee_rate.into(),
                        params.fee_floor.into(),
                        params.coverage_multiplier.into(),
                        params.solvency_multiplier.into(),
                        params.epoch_count.into(),
                    ],
                    TenantUnitKind::CertificateIssuer => vec![peer(TenantUnitKind::Core)?],
                    TenantUnitKind::PolicyIssuer => vec![
                        peer(TenantUnitKind::Core)?,
                        peer(TenantUnitKind::EpochManager)?,
                    ],
                    TenantUnitKind::EpochManager => vec![
                        peer(TenantUnitKind::Core)?,
                        peer(TenantUnitKind::CertificateIssuer)?,
                        peer(TenantUnitKind::PolicyIssuer)?,
                        shared.operator.into(),
                    ],
                };
                Ok(InitCall { kind, args })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { calls })
    }

    /// Calls in dispatch order.
    #[must_use]
    pub fn calls(&self) -> &[InitCall] {
        &self.calls
    }

    /// Take the calls.
    #[must_use]
    pub fn into_calls(self) -> Vec<InitCall> {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::references::peers_of;
    use mp_02_unit_factory::UnitHandle;

    fn params() -> CoreParams {
        CoreParams {
            fee_rate: U256::from(100_000_000_000_000_000u64),
            fee_floor: U256::zero(),
            coverage_multiplier: U256::from(200u64) * U256::exp10(18),
            solvency_multiplier: U256::from(1_100_000_000_000_000_000u64),
            epoch_count: 3,
        }
    }

    fn shared() -> SharedRefs {
        SharedRefs {
            payment_token: Address::new([0xa1; 20]),
            payoff_model: Address::new([0xa2; 20]),
            operator: Address::new([0xa3; 20]),
        }
    }

    fn arena() -> UnitArena {
        let mut arena = UnitArena::new();
        for (seed, kind) in (1u8..).zip(TenantUnitKind::ALL) {
            arena
                .insert(UnitHandle::bind(kind, Address::new([seed; 20])))
                .unwrap();
        }
        arena
    }

    fn tenant_addresses(call: &InitCall, arena: &UnitArena) -> Vec<TenantUnitKind> {
        TenantUnitKind::ALL
            .into_iter()
            .filter(|kind| {
                let address = arena.address_of(*kind).unwrap();
                call.args.contains(&InitArg::Address(address))
            })
            .collect()
    }

    #[test]
    fn test_each_init_names_exactly_its_peers() {
        let arena = arena();
        let plan = WiringPlan::build(&arena, &shared(), &params()).unwrap();

        assert_eq!(plan.calls().len(), 4);
        for call in plan.calls() {
            let mut expected = peers_of(call.kind).to_vec();
            expected.sort();
            assert_eq!(tenant_addresses(call, &arena), expected, "{}", call.kind);
        }
    }

    #[test]
    fn test_core_init_argument_layout() {
        let arena = arena();
        let plan = WiringPlan::build(&arena, &shared(), &params()).unwrap();
        let core = &plan.calls()[0];

        assert_eq!(core.kind, TenantUnitKind::Core);
        assert_eq!(core.args.len(), 11);
        assert_eq!(core.args[0], InitArg::Address(shared().payment_token));
        assert_eq!(core.args[1], InitArg::Address(shared().operator));
        assert_eq!(core.args[4], InitArg::Address(shared().payoff_model));
        assert_eq!(core.args[6], InitArg::Uint(params().fee_rate));
        assert_eq!(core.args[10], InitArg::Uint(U256::from(3)));
    }

    #[test]
    fn test_epoch_manager_gets_operator_last() {
        let plan = WiringPlan::build(&arena(), &shared(), &params()).unwrap();
        let epoch = &plan.calls()[3];
        assert_eq!(epoch.kind, TenantUnitKind::EpochManager);
        assert_eq!(epoch.args.last(), Some(&InitArg::Address(shared().operator)));
    }

    #[test]
    fn test_incomplete_arena_is_rejected() {
        let mut arena = UnitArena::new();
        arena
            .insert(UnitHandle::bind(TenantUnitKind::Core, Address::new([1; 20])))
            .unwrap();

        let result = WiringPlan::build(&arena, &shared(), &params());
        assert!(matches!(
            result,
            Err(WiringError::MissingPeer {
                unit: TenantUnitKind::Core,
                ..
            })
        ));
    }

    #[test]
    fn test_issuer_constructor_args() {
        let tokens = IssuerTokens {
            certificate_name: "L_231007_LC".to_string(),
            certificate_symbol: "L_231007_LC".to_string(),
            policy_name: "L_231007_P".to_string(),
            policy_symbol: "L_231007_P".to_string(),
        };
        assert_eq!(
            tokens.constructor_args(TenantUnitKind::PolicyIssuer),
            vec![InitArg::from("L_231007_P"), InitArg::from("L_231007_P")]
        );
        assert!(tokens.constructor_args(TenantUnitKind::Core).is_empty());
    }
}

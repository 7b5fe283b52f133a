//! Console session state.

use mp_02_unit_factory::UnitHandle;
use shared_types::{Address, TenantDescriptor};

use super::action::ActionOutput;

/// Handles of the shared units of the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedHandles {
    /// Tenant registry unit.
    pub registry: UnitHandle,
    /// Globals viewer unit.
    pub globals_viewer: UnitHandle,
    /// Payoff model unit.
    pub payoff_model: UnitHandle,
    /// Payment token unit.
    pub payment_token: UnitHandle,
}

/// Handles of the selected market's units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantHandles {
    /// Recorded descriptor of the market.
    pub descriptor: TenantDescriptor,
    /// Core unit.
    pub core: UnitHandle,
    /// Certificate issuer unit.
    pub certificate_issuer: UnitHandle,
    /// Policy issuer unit.
    pub policy_issuer: UnitHandle,
    /// Epoch manager unit.
    pub epoch_manager: UnitHandle,
}

/// Every unit the session talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedUnits {
    /// Shared units.
    pub shared: SharedHandles,
    /// Market units.
    pub tenant: TenantHandles,
}

/// State threaded through the menu loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identity submitting calls.
    pub acting: Address,
    /// Accounts the operator may act as.
    pub accounts: Vec<Address>,
    /// Attached units.
    pub units: AttachedUnits,
}

impl Session {
    /// Start acting as the first account.
    #[must_use]
    pub fn new(accounts: Vec<Address>, units: AttachedUnits) -> Option<Self> {
        let acting = *accounts.first()?;
        Some(Self {
            acting,
            accounts,
            units,
        })
    }

    /// Accounts rendered for a choice list, the acting one marked.
    #[must_use]
    pub fn account_choices(&self) -> Vec<String> {
        self.accounts
            .iter()
            .map(|account| {
                if *account == self.acting {
                    format!("{account} (acting)")
                } else {
                    account.to_string()
                }
            })
            .collect()
    }

    /// Apply the session changes an action asked for.
    pub fn apply(&mut self, output: &ActionOutput) {
        if let Some(next) = output.switch_to {
            self.acting = next;
        }
    }
}

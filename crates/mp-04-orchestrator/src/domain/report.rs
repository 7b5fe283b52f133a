//! # Pass Outcome

use serde::Serialize;
use shared_types::{SharedInfra, TenantDescriptor};

use super::state::ProvisioningState;

/// What a successful pass produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionReport {
    /// Target network.
    pub network: String,
    /// The recorded tenant.
    pub descriptor: TenantDescriptor,
    /// Shared infrastructure the tenant is attached to.
    pub shared_infra: SharedInfra,
    /// True if this pass created the shared infrastructure.
    pub shared_created: bool,
    /// Number of operations the environment confirmed during the pass.
    pub confirmations: usize,
    /// Last state reached.
    pub state: ProvisioningState,
}

/// Result of asking for a tenant to be provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ProvisioningOutcome {
    /// A new tenant was provisioned.
    Provisioned(ProvisionReport),
    /// The tenant was already recorded; nothing was done.
    AlreadyProvisioned {
        /// Tenant name.
        name: String,
    },
}

impl ProvisioningOutcome {
    /// The report, if a tenant was provisioned.
    #[must_use]
    pub fn report(&self) -> Option<&ProvisionReport> {
        match self {
            Self::Provisioned(report) => Some(report),
            Self::AlreadyProvisioned { .. } => None,
        }
    }

    /// Returns true for the idempotent no-op outcome.
    #[must_use]
    pub fn is_already_provisioned(&self) -> bool {
        matches!(self, Self::AlreadyProvisioned { .. })
    }
}

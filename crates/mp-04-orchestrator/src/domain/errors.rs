//! # Provisioning Errors
//!
//! | Failure | Registry record written | Units possibly orphaned |
//! |---------|-------------------------|-------------------------|
//! | `Load` / `Record` / `Profile` | no | none |
//! | `Factory` | no | every created unit listed |
//! | `Registration` | no | all four tenant units (+ shared, if created) |
//! | `Persistence` | no | tenant is live and registered, but unrecorded |
//!
//! Nothing is retried: a retry after partial completion would construct
//! duplicates. Every report lists the addresses obtained so far.

use std::fmt;

use mp_01_registry_store::StoreError;
use mp_02_unit_factory::FactoryError;
use mp_03_wiring_engine::WiringError;
use serde::Serialize;
use shared_types::{Address, ParseError, RecordError, TenantUnits, UnitKind};
use thiserror::Error;

use super::state::ProvisioningState;

/// A unit address obtained during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObtainedUnit {
    /// Unit kind.
    pub kind: UnitKind,
    /// Unit address.
    pub address: Address,
    /// True if the pass constructed it, false if it was attached.
    pub created: bool,
}

/// Every unit address a pass obtained, in the order obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObtainedUnits(pub Vec<ObtainedUnit>);

impl ObtainedUnits {
    /// Record a unit.
    pub fn push(&mut self, kind: impl Into<UnitKind>, address: Address, created: bool) {
        self.0.push(ObtainedUnit {
            kind: kind.into(),
            address,
            created,
        });
    }

    /// Units this pass constructed.
    pub fn created(&self) -> impl Iterator<Item = &ObtainedUnit> {
        self.0.iter().filter(|unit| unit.created)
    }

    /// Address obtained for `kind`, if any.
    #[must_use]
    pub fn address_of(&self, kind: impl Into<UnitKind>) -> Option<Address> {
        let kind = kind.into();
        self.0
            .iter()
            .find(|unit| unit.kind == kind)
            .map(|unit| unit.address)
    }

    /// Number of units obtained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was obtained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ObtainedUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("none");
        }
        for unit in &self.0 {
            let how = if unit.created { "constructed" } else { "attached" };
            write!(f, "\n  {:<20} {} ({how})", unit.kind.label(), unit.address)?;
        }
        Ok(())
    }
}

/// Failure of a provisioning pass.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The registry record could not be loaded.
    #[error("loading the registry record for '{network}' failed: {source}")]
    Load {
        /// Target network.
        network: String,
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// The loaded record, or the tenant append, violates a record invariant.
    #[error("registry record rejected: {0}")]
    Record(#[from] RecordError),

    /// A deployment profile value is not a valid amount.
    #[error("invalid deployment profile: {0}")]
    Profile(#[from] ParseError),

    /// A construct, attach or init call failed.
    #[error("step '{step}' failed: {source}\nunits obtained: {obtained}")]
    Factory {
        /// Failed step, e.g. `construct policy-issuer`.
        step: String,
        /// Units obtained before the failure.
        obtained: ObtainedUnits,
        /// Factory error.
        #[source]
        source: FactoryError,
    },

    /// The wiring engine refused to proceed.
    #[error("wiring failed: {source}\nunits obtained: {obtained}")]
    Wiring {
        /// Units obtained before the failure.
        obtained: ObtainedUnits,
        /// Wiring error.
        #[source]
        source: WiringError,
    },

    /// Tenant units are wired but the registry unit refused to add them.
    #[error(
        "registering tenant '{tenant}' failed, its units are constructed and wired but \
         unregistered (core {}): {source}\nunits obtained: {obtained}",
        .units.core
    )]
    Registration {
        /// Tenant name.
        tenant: String,
        /// The four tenant unit addresses.
        units: TenantUnits,
        /// Every unit obtained during the pass.
        obtained: ObtainedUnits,
        /// Factory error.
        #[source]
        source: FactoryError,
    },

    /// All external steps succeeded but the record could not be saved.
    #[error(
        "saving the registry record failed, tenant '{tenant}' is live and registered \
         but unknown locally: {source}\nunits obtained: {obtained}"
    )]
    Persistence {
        /// Tenant name.
        tenant: String,
        /// Every unit obtained during the pass.
        obtained: ObtainedUnits,
        /// Store error.
        #[source]
        source: StoreError,
    },

    /// The pass tried to skip or revisit a state.
    #[error("invalid pass transition {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: ProvisioningState,
        /// Requested state.
        to: ProvisioningState,
    },
}

impl ProvisioningError {
    /// Units obtained before the failure, empty for failures that precede
    /// any factory call.
    #[must_use]
    pub fn obtained(&self) -> Option<&ObtainedUnits> {
        match self {
            Self::Factory { obtained, .. }
            | Self::Wiring { obtained, .. }
            | Self::Registration { obtained, .. }
            | Self::Persistence { obtained, .. } => Some(obtained),
            _ => None,
        }
    }
}

//! # Wiring Errors

use mp_02_unit_factory::FactoryError;
use shared_types::{Address, SharedUnitKind, TenantUnitKind};
use thiserror::Error;

/// Errors from constructing or wiring a tenant's units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    /// The factory refused a construct call.
    #[error("construct {kind} failed with {} unit(s) already constructed: {source}", .constructed.len())]
    Construct {
        /// Unit that could not be constructed.
        kind: TenantUnitKind,
        /// Units constructed before the failure, possibly orphaned.
        constructed: Vec<(TenantUnitKind, Address)>,
        /// Factory error.
        #[source]
        source: FactoryError,
    },

    /// The factory refused an init call.
    #[error("init {kind} failed with {} unit(s) already wired: {source}", .wired.len())]
    Init {
        /// Unit that could not be wired.
        kind: TenantUnitKind,
        /// Units wired before the failure.
        wired: Vec<TenantUnitKind>,
        /// Factory error.
        #[source]
        source: FactoryError,
    },

    /// A second init was attempted for a unit in the same pass.
    #[error("{0} was already wired in this pass")]
    AlreadyWired(TenantUnitKind),

    /// A second unit of the same kind was placed in the arena.
    #[error("{0} was already constructed in this pass")]
    DuplicateConstruct(TenantUnitKind),

    /// A shared unit handle was offered to the per-tenant arena.
    #[error("{0} is a shared unit, not a per-tenant unit")]
    SharedUnit(SharedUnitKind),

    /// A peer referenced by an init has no address yet.
    #[error("{unit} references {peer}, which has not been constructed")]
    MissingPeer {
        /// Unit being wired.
        unit: TenantUnitKind,
        /// Peer without an address.
        peer: TenantUnitKind,
    },

    /// The arena does not hold all four units.
    #[error("tenant units incomplete, missing: {missing:?}")]
    Incomplete {
        /// Kinds without a unit.
        missing: Vec<TenantUnitKind>,
    },
}

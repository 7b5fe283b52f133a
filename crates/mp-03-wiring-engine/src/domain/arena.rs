//! # Unit Arena
//!
//! Holds the handles of one tenant's freshly constructed units, keyed by
//! kind, together with a per-unit wired flag. The arena is filled
//! completely during the construct phase before any init is dispatched.

use std::collections::BTreeMap;

use mp_02_unit_factory::{Confirmation, UnitHandle};
use shared_types::{Address, TenantUnitKind, TenantUnits, UnitKind};

use super::errors::WiringError;

/// A constructed unit and, once wired, the confirmation of its init.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUnit {
    handle: UnitHandle,
    wired: Option<Confirmation>,
}

impl PendingUnit {
    /// Handle of the unit.
    #[must_use]
    pub fn handle(&self) -> &UnitHandle {
        &self.handle
    }

    /// Confirmation of the unit's init, if it was wired.
    #[must_use]
    pub fn wired(&self) -> Option<&Confirmation> {
        self.wired.as_ref()
    }
}

/// Per-tenant units of one provisioning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitArena {
    units: BTreeMap<TenantUnitKind, PendingUnit>,
}

impl UnitArena {
    /// Empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a constructed unit.
    ///
    /// # Errors
    ///
    /// - `SharedUnit` if `handle` is not a per-tenant unit
    /// - `DuplicateConstruct` if a unit of that kind is already present
    pub fn insert(&mut self, handle: UnitHandle) -> Result<TenantUnitKind, WiringError> {
        let kind = match handle.kind() {
            UnitKind::Tenant(kind) => kind,
            UnitKind::Shared(kind) => return Err(WiringError::SharedUnit(kind)),
        };
        if self.units.contains_key(&kind) {
            return Err(WiringError::DuplicateConstruct(kind));
        }
        self.units.insert(
            kind,
            PendingUnit {
                handle,
                wired: None,
            },
        );
        Ok(kind)
    }

    /// The unit of `kind`, if constructed.
    #[must_use]
    pub fn get(&self, kind: TenantUnitKind) -> Option<&PendingUnit> {
        self.units.get(&kind)
    }

    /// Address of the unit of `kind`, if constructed.
    #[must_use]
    pub fn address_of(&self, kind: TenantUnitKind) -> Option<Address> {
        self.units.get(&kind).map(|unit| unit.handle.address())
    }

    /// Constructed units in kind order.
    #[must_use]
    pub fn constructed(&self) -> Vec<(TenantUnitKind, Address)> {
        self.units
            .iter()
            .map(|(kind, unit)| (*kind, unit.handle.address()))
            .collect()
    }

    /// Kinds that have no unit yet.
    #[must_use]
    pub fn missing(&self) -> Vec<TenantUnitKind> {
        TenantUnitKind::ALL
            .into_iter()
            .filter(|kind| !self.units.contains_key(kind))
            .collect()
    }

    /// Returns true once all four kinds are constructed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Returns true if the unit of `kind` has been wired.
    #[must_use]
    pub fn is_wired(&self, kind: TenantUnitKind) -> bool {
        self.units
            .get(&kind)
            .is_some_and(|unit| unit.wired.is_some())
    }

    /// Kinds wired so far.
    #[must_use]
    pub fn wired_kinds(&self) -> Vec<TenantUnitKind> {
        self.units
            .iter()
            .filter(|(_, unit)| unit.wired.is_some())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Returns true once every constructed unit has been wired.
    #[must_use]
    pub fn is_fully_wired(&self) -> bool {
        self.is_complete() && self.units.values().all(|unit| unit.wired.is_some())
    }

    /// Record that the unit of `kind` was wired.
    ///
    /// # Errors
    ///
    /// - `Incomplete` if no unit of `kind` exists
    /// - `AlreadyWired` if it was wired before
    pub fn mark_wired(
        &mut self,
        kind: TenantUnitKind,
        confirmation: Confirmation,
    ) -> Result<(), WiringError> {
        let unit = self
            .units
            .get_mut(&kind)
            .ok_or(WiringError::Incomplete {
                missing: vec![kind],
            })?;
        if unit.wired.is_some() {
            return Err(WiringError::AlreadyWired(kind));
        }
        unit.wired = Some(confirmation);
        Ok(())
    }

    /// Addresses of all four units.
    ///
    /// # Errors
    ///
    /// `Incomplete` if any kind is missing.
    pub fn tenant_units(&self) -> Result<TenantUnits, WiringError> {
        let address = |kind| {
            self.address_of(kind).ok_or_else(|| WiringError::Incomplete {
                missing: self.missing(),
            })
        };
        Ok(TenantUnits {
            core: address(TenantUnitKind::Core)?,
            certificate_issuer: address(TenantUnitKind::CertificateIssuer)?,
            policy_issuer: address(TenantUnitKind::PolicyIssuer)?,
            epoch_manager: address(TenantUnitKind::EpochManager)?,
        })
    }
}

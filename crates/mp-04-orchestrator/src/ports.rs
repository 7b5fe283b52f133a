//! # Ports Layer
//!
//! The orchestrator needs a unit factory that also exposes the shared
//! registry and payment token operations. Any type implementing the three
//! factory ports qualifies.

use mp_02_unit_factory::{PaymentTokenUnit, TenantRegistryUnit, UnitFactory};

/// Everything a provisioning pass calls on the execution environment.
pub trait UnitBackend: UnitFactory + TenantRegistryUnit + PaymentTokenUnit {}

impl<T> UnitBackend for T where T: UnitFactory + TenantRegistryUnit + PaymentTokenUnit + ?Sized {}

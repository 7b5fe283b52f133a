//! # MP-04 Provisioning Orchestrator
//!
//! **Component ID:** 4
//!
//! ## Purpose
//!
//! Drives one provisioning pass: shared infrastructure is created on the
//! first pass of a network and attached on every later one, then one tenant
//! is constructed, wired, registered and recorded.
//!
//! ## Pass State Machine
//!
//! ```text
//! Start -> SharedInfraResolved -> TenantConstructed -> TenantWired
//!       -> TenantRegistered -> Persisted
//! ```
//!
//! Any failure leaves the pass in its current state and reports every unit
//! address obtained so far. The registry record is written once, after
//! registration succeeded. A tenant name already in the record ends the pass
//! before any environment call with `ProvisioningOutcome::AlreadyProvisioned`.
//!
//! ## Module Structure
//!
//! ```text
//! mp-04-orchestrator/
//! ├── domain/      # ProvisioningState, profiles, report, ProvisioningError
//! ├── ports.rs     # UnitBackend (factory + registry unit + payment token)
//! └── service.rs   # ProvisioningOrchestrator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::{
        DeploymentProfile, ObtainedUnit, ObtainedUnits, ProvisionReport, ProvisioningError,
        ProvisioningOutcome, ProvisioningState, TenantProfile,
    };
    pub use crate::ports::UnitBackend;
    pub use crate::service::ProvisioningOrchestrator;
}

pub use prelude::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID used as the log prefix (`[mp-04]`).
pub const COMPONENT_ID: u8 = 4;

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::COMPONENT_ID, 4);
    }
}

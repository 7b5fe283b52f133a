//! # MP-02 Unit Factory
//!
//! **Component ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! The boundary between the provisioner and the execution environment that
//! hosts deployable units. Unit internals are opaque: the provisioner only
//! creates units, binds to existing ones and hands each one its peer
//! addresses exactly once.
//!
//! ## Contract
//!
//! | Operation | Side effect |
//! |-----------|-------------|
//! | `construct(kind, args)` | Allocates a new unit with a fresh address. Not idempotent. |
//! | `attach(kind, address)` | None. Verifies the unit exists and binds a handle. |
//! | `init(handle, args)` | Wires cross-references. Accepted once per unit. |
//! | `add_tenant` / `remove_tenant` / `list_tenants` | Tenant registry membership |
//!
//! Every call is `async` and resolves only once the environment has
//! confirmed it. Callers await each call before issuing the next.
//!
//! ## Simulated Environment
//!
//! `SimulatedChain` implements every port in-process: deterministic
//! accounts, CREATE-style addresses, a token ledger, tenant registries, a
//! clock and optional JSON snapshots so separate processes share state.
//! `FaultRule`s make a chosen call fail once, for exercising failure paths.
//!
//! ## Module Structure
//!
//! ```text
//! mp-02-unit-factory/
//! ├── domain/      # UnitHandle, InitArg, Confirmation, FactoryError, address derivation
//! ├── ports/       # UnitFactory, TenantRegistryUnit, PaymentTokenUnit, ExecutionEnvironment
//! └── adapters/    # SimulatedChain, FaultRule
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{
        DeployedUnit, FaultRule, FaultTarget, RegistryEntry, SimulatedChain,
        SimulatedChainConfig, TokenLedger, UnitState, CALL_LOG_LIMIT,
    };
    pub use crate::domain::{
        compute_tx_hash, compute_unit_address, derive_account, keccak256, CallRecord,
        Confirmation, FactoryError, InitArg, TenantListing, UnitCall, UnitHandle,
    };
    pub use crate::ports::{ExecutionEnvironment, PaymentTokenUnit, TenantRegistryUnit, UnitFactory};
}

pub use prelude::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID used as the log prefix (`[mp-02]`).
pub const COMPONENT_ID: u8 = 2;

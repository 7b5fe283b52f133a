//! # MP-03 Dependency Wiring Engine
//!
//! **Component ID:** 3
//!
//! ## Purpose
//!
//! The four per-tenant units reference each other circularly:
//!
//! | Unit | Needs at init |
//! |------|---------------|
//! | Core | CertificateIssuer, PolicyIssuer, EpochManager (+ payment token, payoff model, operator) |
//! | CertificateIssuer | Core |
//! | PolicyIssuer | Core, EpochManager |
//! | EpochManager | Core, CertificateIssuer, PolicyIssuer (+ operator) |
//!
//! No construction order can satisfy that graph, so identity allocation and
//! reference resolution are split:
//!
//! 1. **Construct**: every unit gets an address; nobody knows its peers yet.
//!    The handles go into a `UnitArena` keyed by kind.
//! 2. **Wire**: once the arena is complete, each unit receives exactly one
//!    init with its peers' addresses. Inits depend only on addresses, never
//!    on a peer being initialized, so their relative order is free.
//!
//! The arena keeps a wired flag per unit and refuses a second init within
//! the same pass.
//!
//! ## Module Structure
//!
//! ```text
//! mp-03-wiring-engine/
//! ├── domain/      # UnitArena, peer table, WiringPlan, WiringError
//! └── service.rs   # WiringEngine (construct_all, wire_all, dispatch)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::{
        peers_of, CoreParams, InitCall, IssuerTokens, PendingUnit, SharedRefs, UnitArena,
        WiringError, WiringPlan,
    };
    pub use crate::service::WiringEngine;
}

pub use prelude::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID used as the log prefix (`[mp-03]`).
pub const COMPONENT_ID: u8 = 3;

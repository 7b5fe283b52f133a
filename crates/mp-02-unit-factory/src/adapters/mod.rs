//! # Adapters Layer
//!
//! - `SimulatedChain`: in-process environment implementing every port
//! - `FaultRule`: one-shot failure injection for `SimulatedChain`

mod faults;
mod simulated_chain;

pub use faults::{FaultRule, FaultTarget};
pub use simulated_chain::{
    DeployedUnit, CALL_LOG_LIMIT, RegistryEntry, SimulatedChain, SimulatedChainConfig, TokenLedger, UnitState,
};

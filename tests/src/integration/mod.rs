//! Cross-component flows.
//!
//! Every flow runs real passes against `SimulatedChain` and, where the
//! on-disk format matters, `JsonFileRegistryStore` in a temporary directory.

pub mod console_flows;
pub mod failure_flows;
pub mod provisioning_flows;

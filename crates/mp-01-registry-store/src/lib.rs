//! # MP-01 Registry Store
//!
//! **Component ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Durable key-value record of what has been provisioned per network. One
//! record per network identifier, never merged across networks.
//!
//! ## Contract
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | `load(network)` | Persisted record, or an empty record if none exists. Never fails on absence. |
//! | `save(record)` | Overwrites the whole record for `record.network`, atomically. |
//!
//! ## Single-Writer Assumption
//!
//! No locking is implemented. Running two provisioning passes against the
//! same network at the same time is unsupported and may break the record invariants.
//!
//! ## Module Structure
//!
//! ```text
//! mp-01-registry-store/
//! ├── domain/      # StoreError, on-disk document decoding (current + legacy)
//! ├── ports/       # RegistryStore trait
//! └── adapters/    # JsonFileRegistryStore, InMemoryRegistryStore
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::{InMemoryRegistryStore, JsonFileRegistryStore};
    pub use crate::domain::{decode_document, StoreError};
    pub use crate::ports::RegistryStore;
}

pub use prelude::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component ID used as the log prefix (`[mp-01]`).
pub const COMPONENT_ID: u8 = 1;

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::COMPONENT_ID, 1);
    }
}

//! # Ports Layer
//!
//! The registry store contract the orchestrator and the console depend on.
//! Adapters in `crate::adapters` implement it.

use shared_types::RegistryRecord;

use crate::domain::StoreError;

/// Durable per-network registry storage.
///
/// ## Implementation Notes
///
/// - Location is keyed solely by network identifier.
/// - `save` replaces the whole record; partial updates are not expressible.
/// - Implementations assume a single writer per network.
pub trait RegistryStore: Send + Sync {
    /// Load the record for `network`.
    ///
    /// # Returns
    ///
    /// * The persisted record, validated with `RegistryRecord::validate`
    /// * An empty record if nothing has been persisted for `network`
    ///
    /// # Errors
    ///
    /// Never fails on absence. Fails on unreadable or invalid content.
    fn load(&self, network: &str) -> Result<RegistryRecord, StoreError>;

    /// Persist `record`, overwriting any prior content for `record.network`.
    ///
    /// # Errors
    ///
    /// Fails if the record is invalid or the backend cannot write it. A
    /// failed save leaves the prior content in place.
    fn save(&self, record: &RegistryRecord) -> Result<(), StoreError>;

    /// Returns true if a record has been persisted for `network`.
    ///
    /// # Errors
    ///
    /// Fails if the network identifier is invalid or the backend is unreadable.
    fn exists(&self, network: &str) -> Result<bool, StoreError>;
}

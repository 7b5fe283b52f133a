use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use shared_types::{validate_network_id, RegistryRecord};

use crate::domain::StoreError;
use crate::ports::RegistryStore;

/// In-memory registry store for testing.
///
/// Records are cloned in and out, so callers never share mutable state with
/// the store. Saves can be made to fail to exercise persistence failures.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    records: RwLock<HashMap<String, RegistryRecord>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl InMemoryRegistryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `record`.
    #[must_use]
    pub fn with_record(record: RegistryRecord) -> Self {
        let store = Self::new();
        store
            .records
            .write()
            .insert(record.network.clone(), record);
        store
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every subsequent save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Current stored record for `network`, if any.
    pub fn snapshot(&self, network: &str) -> Option<RegistryRecord> {
        self.records.read().get(network).cloned()
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self, network: &str) -> Result<RegistryRecord, StoreError> {
        validate_network_id(network).map_err(|_| StoreError::InvalidNetwork(network.to_string()))?;
        Ok(self
            .snapshot(network)
            .unwrap_or_else(|| RegistryRecord::empty(network)))
    }

    fn save(&self, record: &RegistryRecord) -> Result<(), StoreError> {
        record.validate().map_err(|source| StoreError::Invalid {
            network: record.network.clone(),
            source,
        })?;
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save failure injected".to_string()));
        }
        self.records
            .write()
            .insert(record.network.clone(), record.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exists(&self, network: &str) -> Result<bool, StoreError> {
        validate_network_id(network).map_err(|_| StoreError::InvalidNetwork(network.to_string()))?;
        Ok(self.records.read().contains_key(network))
    }
}

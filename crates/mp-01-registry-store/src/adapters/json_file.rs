//! JSON file adapter: one pretty-printed registry document per network.
//!
//! A save writes `<file>.json.tmp`, syncs it, renames it over the document
//! and then syncs the directory, so after a crash either the old or the new
//! document is on disk, never a torn one.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use shared_types::{validate_network_id, RegistryRecord};
use tracing::{debug, info};

use crate::domain::{decode_document, StoreError};
use crate::ports::RegistryStore;

/// File-backed registry store.
///
/// Keeps one document per network at `<dir>/.env.<network>.json`. Writes go
/// through a temp file and a rename so a crash mid-write leaves the previous
/// document intact.
#[derive(Debug, Clone)]
pub struct JsonFileRegistryStore {
    dir: PathBuf,
}

impl JsonFileRegistryStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the registry documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `network`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNetwork` if the identifier could escape `dir`.
    pub fn path_for(&self, network: &str) -> Result<PathBuf, StoreError> {
        validate_network_id(network).map_err(|_| StoreError::InvalidNetwork(network.to_string()))?;
        Ok(self.dir.join(format!(".env.{network}.json")))
    }

    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, &e))?;

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(|e| StoreError::io(&temp_path, &e))?;
        file.write_all(bytes)
            .map_err(|e| StoreError::io(&temp_path, &e))?;
        file.sync_all().map_err(|e| StoreError::io(&temp_path, &e))?;

        fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, &e))?;
        sync_dir(&self.dir)
    }
}

/// Flush the directory entry of a rename.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|e| StoreError::io(dir, &e))
}

/// Directory handles cannot be synced on this platform.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

impl RegistryStore for JsonFileRegistryStore {
    fn load(&self, network: &str) -> Result<RegistryRecord, StoreError> {
        let path = self.path_for(network)?;

        if !path.exists() {
            info!(
                network = %network,
                path = %path.display(),
                "[mp-01] No registry document, starting from an empty record"
            );
            return Ok(RegistryRecord::empty(network));
        }

        let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, &e))?;
        let record = decode_document(&path, &text, network)?;

        info!(
            network = %network,
            shared_infra = record.has_shared_infra(),
            tenants = record.tenants.len(),
            "[mp-01] Loaded registry record from {}",
            path.display()
        );
        Ok(record)
    }

    fn save(&self, record: &RegistryRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.network)?;
        record.validate().map_err(|source| StoreError::Invalid {
            network: record.network.clone(),
            source,
        })?;

        let mut text = serde_json::to_string_pretty(record).map_err(|e| StoreError::Malformed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        text.push('\n');

        self.write_atomically(&path, text.as_bytes())?;

        debug!(bytes = text.len(), "[mp-01] Wrote {}", path.display());
        info!(
            network = %record.network,
            tenants = record.tenants.len(),
            "[mp-01] Registry record saved"
        );
        Ok(())
    }

    fn exists(&self, network: &str) -> Result<bool, StoreError> {
        Ok(self.path_for(network)?.exists())
    }
}

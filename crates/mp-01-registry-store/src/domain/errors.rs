//! # Store Errors

use std::path::PathBuf;

use shared_types::RecordError;
use thiserror::Error;

/// Errors from loading or saving a registry record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network identifier cannot be used as a storage key.
    #[error("invalid network identifier: '{0}'")]
    InvalidNetwork(String),

    /// Filesystem operation failed.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error text.
        message: String,
    },

    /// File content is not a registry document.
    #[error("malformed registry document {path}: {message}")]
    Malformed {
        /// File involved.
        path: PathBuf,
        /// Decoder error text.
        message: String,
    },

    /// Legacy document records only some shared units.
    #[error("registry document {path} records partial shared infrastructure, missing: {}", .missing.join(", "))]
    PartialSharedInfra {
        /// File involved.
        path: PathBuf,
        /// Shared fields that are absent.
        missing: Vec<String>,
    },

    /// Decoded record violates an invariant.
    #[error("registry record for '{network}' is invalid: {source}")]
    Invalid {
        /// Network of the record.
        network: String,
        /// Violated invariant.
        #[source]
        source: RecordError,
    },

    /// Backend refused the operation.
    #[error("registry store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

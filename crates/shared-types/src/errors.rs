//! # Error Types
//!
//! Errors raised while parsing primitives and while checking registry records.

use thiserror::Error;

/// Errors from parsing text into a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Not a 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Not a 32-byte hex hash.
    #[error("invalid hash: {0}")]
    InvalidHash(String),

    /// Not a non-negative decimal amount.
    #[error("invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },
}

/// Violations of the registry record invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Two tenants share a name, or a re-provision was attempted.
    #[error("tenant already recorded: {0}")]
    DuplicateTenant(String),

    /// Tenants are recorded but shared infrastructure is not.
    #[error("{count} tenant(s) recorded without shared infrastructure")]
    TenantsWithoutSharedInfra { count: usize },

    /// Record belongs to a different network.
    #[error("record is for network '{found}', expected '{expected}'")]
    NetworkMismatch { expected: String, found: String },

    /// Network identifier is empty or contains forbidden characters.
    #[error("invalid network identifier: '{0}'")]
    InvalidNetwork(String),

    /// Tenant name is blank, padded with whitespace or holds control characters.
    #[error("invalid tenant name: {0:?}")]
    InvalidTenantName(String),

    /// A recorded unit address is the zero address.
    #[error("zero address recorded for {unit}")]
    ZeroAddress { unit: String },
}

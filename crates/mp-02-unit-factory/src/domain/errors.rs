//! # Factory Errors

use shared_types::{Address, UnitKind, U256};
use thiserror::Error;

/// Errors returned by the execution environment.
///
/// Every variant means the operation was not confirmed and had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    /// The environment refused the submission or denied confirmation.
    #[error("{operation} rejected: {reason}")]
    Rejected {
        /// Operation that was refused.
        operation: String,
        /// Reason given by the environment.
        reason: String,
    },

    /// No unit exists at the address.
    #[error("no {kind} unit at {address}")]
    UnknownUnit {
        /// Kind the caller expected.
        kind: UnitKind,
        /// Address that was looked up.
        address: Address,
    },

    /// A unit exists at the address but is of another kind.
    #[error("unit at {address} is a {found}, expected {expected}")]
    KindMismatch {
        /// Address that was looked up.
        address: Address,
        /// Kind the caller expected.
        expected: UnitKind,
        /// Kind actually deployed there.
        found: UnitKind,
    },

    /// The unit's one-shot init was already consumed.
    #[error("{kind} at {address} is already initialized")]
    AlreadyInitialized {
        /// Kind of the unit.
        kind: UnitKind,
        /// Address of the unit.
        address: Address,
    },

    /// A transfer exceeds the sender's balance or allowance.
    #[error("insufficient balance: {owner} holds {available}, needs {required}")]
    InsufficientBalance {
        /// Account being debited.
        owner: Address,
        /// Amount requested.
        required: U256,
        /// Amount available.
        available: U256,
    },

    /// The acting identity is not an account of the environment.
    #[error("unknown account {0}")]
    UnknownAccount(Address),

    /// The environment itself failed (snapshot I/O, misconfiguration).
    #[error("execution environment error: {0}")]
    Environment(String),
}

impl FactoryError {
    /// Shorthand for a rejection.
    pub fn rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

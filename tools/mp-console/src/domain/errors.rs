//! Console errors.
//!
//! Validation and action failures are reported and the menu loop carries
//! on. Only startup failures end the process.

use mp_01_registry_store::StoreError;
use mp_02_unit_factory::FactoryError;
use shared_types::{Address, UnitKind};
use thiserror::Error;

use super::action::ConsoleAction;

/// Rejected operator input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a non-negative decimal with at most 18 fractional digits.
    #[error("'{input}' is not a valid amount: {reason}")]
    Amount {
        /// Raw input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Not a whole number of days in range.
    #[error("'{0}' is not a whole number of days between 1 and 365")]
    Duration(String),

    /// Not a non-negative integer id.
    #[error("'{0}' is not a certificate or policy id")]
    Id(String),

    /// Not one of the listed options.
    #[error("'{0}' is not one of the listed choices")]
    Choice(String),
}

/// Failure of one console action.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Operator input was rejected before anything was submitted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The environment refused the call.
    #[error("environment call failed: {0}")]
    Factory(#[from] FactoryError),

    /// A choice was requested from an empty list.
    #[error("nothing to choose from: {0}")]
    NothingToChoose(String),

    /// Input ended.
    #[error("input closed")]
    InputClosed,

    /// A handler was given input of another shape than its table entry asks for.
    #[error("{0} received input it does not take")]
    UnexpectedInput(ConsoleAction),

    /// The action has no row in the dispatch table.
    #[error("{0} has no handler")]
    NoHandler(ConsoleAction),
}

/// Failure to start a console session.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The registry record could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record holds no market.
    #[error("no market recorded on '{0}', run mp-provision first")]
    NoMarkets(String),

    /// The requested market is not recorded.
    #[error("market '{name}' is not recorded on '{network}'")]
    UnknownMarket {
        /// Network searched.
        network: String,
        /// Requested market.
        name: String,
    },

    /// A recorded unit is missing from the environment.
    #[error("attaching {kind} at {address} failed: {source}")]
    Attach {
        /// Unit kind.
        kind: UnitKind,
        /// Recorded address.
        address: Address,
        /// Factory error.
        #[source]
        source: FactoryError,
    },

    /// Market selection failed.
    #[error("market selection failed: {0}")]
    Selection(#[source] ActionError),

    /// The environment has no account to act with.
    #[error("the environment exposes no accounts")]
    NoAccounts,
}

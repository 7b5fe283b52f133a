//! # Unit Factory Entities

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::{Address, TxHash, UnitKind, U256};

// =============================================================================
// HANDLES
// =============================================================================

/// A binding to one unit in the execution environment.
///
/// Handles are issued by `construct` and `attach`; holding one means the
/// environment confirmed a unit of `kind` lives at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitHandle {
    kind: UnitKind,
    address: Address,
}

impl UnitHandle {
    /// Bind a handle. Intended for factory implementations; everyone else
    /// obtains handles through `construct` or `attach`.
    #[must_use]
    pub fn bind(kind: impl Into<UnitKind>, address: Address) -> Self {
        Self {
            kind: kind.into(),
            address,
        }
    }

    /// Kind of the bound unit.
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Address of the bound unit.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind, self.address)
    }
}

// =============================================================================
// ARGUMENTS
// =============================================================================

/// One positional argument of a construct, init or unit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InitArg {
    /// A unit or account address.
    Address(Address),
    /// An unsigned integer, amounts in 18-decimal base units.
    Uint(U256),
    /// A string.
    Text(String),
}

impl InitArg {
    /// The address, if this argument is one.
    #[must_use]
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }

    /// The integer, if this argument is one.
    #[must_use]
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for InitArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "\"{text}\""),
        }
    }
}

impl From<Address> for InitArg {
    fn from(address: Address) -> Self {
        Self::Address(address)
    }
}

impl From<U256> for InitArg {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<u64> for InitArg {
    fn from(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }
}

impl From<&str> for InitArg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for InitArg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// An opaque operation on a unit, identified by method name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCall {
    /// Method name as the unit exposes it.
    pub method: String,
    /// Positional arguments.
    pub args: Vec<InitArg>,
}

impl UnitCall {
    /// A call with no arguments yet.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<InitArg>) -> Self {
        self.args.push(arg.into());
        self
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Proof that the environment accepted and confirmed an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Identifier of the confirmed operation.
    pub tx_hash: TxHash,
    /// Block the operation was included in.
    pub block_number: u64,
}

/// Tenant registry listing as parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantListing {
    /// Core unit address of each registered tenant.
    pub addresses: Vec<Address>,
    /// Name of each registered tenant, same order as `addresses`.
    pub names: Vec<String>,
}

impl TenantListing {
    /// Number of registered tenants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Returns true if no tenant is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// A submitted unit call, as recorded by an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Submitting account.
    pub actor: Address,
    /// Target unit.
    pub target: Address,
    /// The call itself.
    pub call: UnitCall,
    /// Block the call was confirmed in.
    pub block_number: u64,
}

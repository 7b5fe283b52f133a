//! # Core Domain Entities
//!
//! Addresses, transaction hashes and the unit kinds the provisioner deploys.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`, `TxHash`
//! - **Unit Kinds**: `SharedUnitKind`, `TenantUnitKind`, `UnitKind`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::ParseError;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte Ethereum-style address.
///
/// Serialized as a `0x`-prefixed lowercase hex string, which is the form the
/// registry file stores.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s.trim());
        let bytes =
            hex::decode(digits).map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        Self::from_slice(&bytes).ok_or_else(|| ParseError::InvalidAddress(s.to_string()))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// TRANSACTION HASH (32 bytes)
// =============================================================================

/// A 32-byte transaction hash returned with every confirmation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(strip_hex_prefix(s.trim()))
            .map_err(|_| ParseError::InvalidHash(s.to_string()))?;
        <[u8; 32]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| ParseError::InvalidHash(s.to_string()))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

// =============================================================================
// UNIT KINDS
// =============================================================================

/// Units provisioned once per network and referenced by every tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SharedUnitKind {
    /// Registry of all tenants on the network.
    TenantRegistry,
    /// Pricing / globals viewer.
    GlobalsViewer,
    /// Payoff model used for premium pricing.
    PayoffModel,
    /// Test payment token.
    PaymentToken,
}

impl SharedUnitKind {
    /// All shared kinds, in construction order.
    pub const ALL: [SharedUnitKind; 4] = [
        Self::TenantRegistry,
        Self::GlobalsViewer,
        Self::PayoffModel,
        Self::PaymentToken,
    ];

    /// Deployable artifact implementing this kind.
    #[must_use]
    pub fn artifact(&self) -> &'static str {
        match self {
            Self::TenantRegistry => "MetaDefenderMarketsRegistry",
            Self::GlobalsViewer => "GlobalsViewer",
            Self::PayoffModel => "AmericanBinaryOptions",
            Self::PaymentToken => "TestERC20",
        }
    }

    /// Short label used in logs and failure reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::TenantRegistry => "registry",
            Self::GlobalsViewer => "globals-viewer",
            Self::PayoffModel => "payoff-model",
            Self::PaymentToken => "payment-token",
        }
    }
}

/// The four units unique to one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TenantUnitKind {
    /// Core market unit.
    Core,
    /// Issues liquidity certificates.
    CertificateIssuer,
    /// Issues coverage policies.
    PolicyIssuer,
    /// Tracks epochs.
    EpochManager,
}

impl TenantUnitKind {
    /// All per-tenant kinds, in construct and wire order.
    pub const ALL: [TenantUnitKind; 4] = [
        Self::Core,
        Self::CertificateIssuer,
        Self::PolicyIssuer,
        Self::EpochManager,
    ];

    /// Deployable artifact implementing this kind.
    #[must_use]
    pub fn artifact(&self) -> &'static str {
        match self {
            Self::Core => "MetaDefender",
            Self::CertificateIssuer => "LiquidityCertificate",
            Self::PolicyIssuer => "Policy",
            Self::EpochManager => "EpochManage",
        }
    }

    /// Short label used in logs and failure reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::CertificateIssuer => "certificate-issuer",
            Self::PolicyIssuer => "policy-issuer",
            Self::EpochManager => "epoch-manager",
        }
    }
}

/// Any unit kind the factory can construct or attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Shared per-network unit.
    Shared(SharedUnitKind),
    /// Per-tenant unit.
    Tenant(TenantUnitKind),
}

impl UnitKind {
    /// Deployable artifact implementing this kind.
    #[must_use]
    pub fn artifact(&self) -> &'static str {
        match self {
            Self::Shared(kind) => kind.artifact(),
            Self::Tenant(kind) => kind.artifact(),
        }
    }

    /// Short label used in logs and failure reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shared(kind) => kind.label(),
            Self::Tenant(kind) => kind.label(),
        }
    }
}

impl From<SharedUnitKind> for UnitKind {
    fn from(kind: SharedUnitKind) -> Self {
        Self::Shared(kind)
    }
}

impl From<TenantUnitKind> for UnitKind {
    fn from(kind: TenantUnitKind) -> Self {
        Self::Tenant(kind)
    }
}

impl fmt::Display for SharedUnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TenantUnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// TESTS
// =============================================================================

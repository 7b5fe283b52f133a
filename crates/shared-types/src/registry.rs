//! # Registry Record
//!
//! The durable per-network description of shared infrastructure and of every
//! provisioned tenant.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Tenant names are unique | `RegistryRecord::append_tenant`, `RegistryRecord::validate` |
//! | Shared infra fully present or absent | `Option<SharedInfra>` with non-optional fields |
//! | A tenant is recorded with all four units | `TenantUnits` has no optional fields |
//! | Recorded addresses are never overwritten | `append_tenant` rejects, never replaces |

use serde::{Deserialize, Serialize};

use crate::entities::{Address, SharedUnitKind, TenantUnitKind};
use crate::errors::RecordError;

/// Addresses of the shared units of one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedInfra {
    /// Tenant registry unit.
    pub registry: Address,
    /// Pricing / globals viewer unit.
    pub globals_viewer: Address,
    /// Test payment token unit.
    pub payment_token: Address,
    /// Payoff model unit.
    pub payoff_model: Address,
}

impl SharedInfra {
    /// Address recorded for a shared kind.
    #[must_use]
    pub fn address_of(&self, kind: SharedUnitKind) -> Address {
        match kind {
            SharedUnitKind::TenantRegistry => self.registry,
            SharedUnitKind::GlobalsViewer => self.globals_viewer,
            SharedUnitKind::PayoffModel => self.payoff_model,
            SharedUnitKind::PaymentToken => self.payment_token,
        }
    }

    /// All `(kind, address)` pairs in construction order.
    #[must_use]
    pub fn entries(&self) -> [(SharedUnitKind, Address); 4] {
        SharedUnitKind::ALL.map(|kind| (kind, self.address_of(kind)))
    }
}

/// Addresses of the four per-tenant units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantUnits {
    /// Core unit.
    #[serde(rename = "metaDefender")]
    pub core: Address,
    /// Certificate issuer unit.
    #[serde(rename = "liquidityCertificate")]
    pub certificate_issuer: Address,
    /// Policy issuer unit.
    #[serde(rename = "policy")]
    pub policy_issuer: Address,
    /// Epoch manager unit.
    #[serde(rename = "epochManage")]
    pub epoch_manager: Address,
}

impl TenantUnits {
    /// Address recorded for a per-tenant kind.
    #[must_use]
    pub fn address_of(&self, kind: TenantUnitKind) -> Address {
        match kind {
            TenantUnitKind::Core => self.core,
            TenantUnitKind::CertificateIssuer => self.certificate_issuer,
            TenantUnitKind::PolicyIssuer => self.policy_issuer,
            TenantUnitKind::EpochManager => self.epoch_manager,
        }
    }

    /// All `(kind, address)` pairs in wire order.
    #[must_use]
    pub fn entries(&self) -> [(TenantUnitKind, Address); 4] {
        TenantUnitKind::ALL.map(|kind| (kind, self.address_of(kind)))
    }
}

/// Opaque tenant metadata. Not interpreted by the provisioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantMetadata {
    /// Unique tenant name.
    #[serde(rename = "marketName")]
    pub name: String,
    /// Free-form description.
    #[serde(rename = "marketDescription")]
    pub description: String,
    /// Symbol of the token premiums are paid in.
    #[serde(rename = "marketPaymentToken")]
    pub payment_token_symbol: String,
    /// Kind of protection the market sells.
    #[serde(rename = "marketProtectionType")]
    pub protection_type: String,
    /// Network label of the insured asset.
    pub network: String,
}

/// One provisioned tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDescriptor {
    /// Tenant metadata.
    #[serde(flatten)]
    pub metadata: TenantMetadata,
    /// Tenant unit addresses.
    #[serde(flatten)]
    pub units: TenantUnits,
}

impl TenantDescriptor {
    /// Tenant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// The per-network registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Network identifier this record belongs to.
    pub network: String,
    /// Shared infrastructure, absent until the first pass on this network.
    #[serde(
        rename = "sharedInfra",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shared_infra: Option<SharedInfra>,
    /// Tenants in provisioning order.
    pub tenants: Vec<TenantDescriptor>,
}

impl RegistryRecord {
    /// An empty record: no shared infra, no tenants.
    #[must_use]
    pub fn empty(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            shared_infra: None,
            tenants: Vec::new(),
        }
    }

    /// Returns true if shared infrastructure has been provisioned.
    #[must_use]
    pub fn has_shared_infra(&self) -> bool {
        self.shared_infra.is_some()
    }

    /// Look up a tenant by name.
    #[must_use]
    pub fn find_tenant(&self, name: &str) -> Option<&TenantDescriptor> {
        self.tenants.iter().find(|t| t.name() == name)
    }

    /// Returns true if a tenant with this name is recorded.
    #[must_use]
    pub fn contains_tenant(&self, name: &str) -> bool {
        self.find_tenant(name).is_some()
    }

    /// Tenant names in provisioning order.
    #[must_use]
    pub fn tenant_names(&self) -> Vec<&str> {
        self.tenants.iter().map(TenantDescriptor::name).collect()
    }

    /// Append a fully provisioned tenant.
    ///
    /// # Errors
    ///
    /// - `DuplicateTenant` if the name is already recorded
    /// - `TenantsWithoutSharedInfra` if shared infra is absent
    pub fn append_tenant(&mut self, descriptor: TenantDescriptor) -> Result<(), RecordError> {
        if self.shared_infra.is_none() {
            return Err(RecordError::TenantsWithoutSharedInfra {
                count: self.tenants.len() + 1,
            });
        }
        validate_tenant_name(descriptor.name())?;
        if self.contains_tenant(descriptor.name()) {
            return Err(RecordError::DuplicateTenant(descriptor.name().to_string()));
        }
        self.tenants.push(descriptor);
        Ok(())
    }

    /// Check the record invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), RecordError> {
        validate_network_id(&self.network)?;

        if self.shared_infra.is_none() && !self.tenants.is_empty() {
            return Err(RecordError::TenantsWithoutSharedInfra {
                count: self.tenants.len(),
            });
        }

        if let Some(shared) = &self.shared_infra {
            for (kind, address) in shared.entries() {
                if address.is_zero() {
                    return Err(RecordError::ZeroAddress {
                        unit: kind.label().to_string(),
                    });
                }
            }
        }

        for (index, tenant) in self.tenants.iter().enumerate() {
            validate_tenant_name(tenant.name())?;
            if self.tenants[..index]
                .iter()
                .any(|earlier| earlier.name() == tenant.name())
            {
                return Err(RecordError::DuplicateTenant(tenant.name().to_string()));
            }
            for (kind, address) in tenant.units.entries() {
                if address.is_zero() {
                    return Err(RecordError::ZeroAddress {
                        unit: format!("{}/{}", tenant.name(), kind.label()),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Check that a network identifier is non-empty and limited to
/// `[A-Za-z0-9_-]`.
///
/// # Errors
///
/// Returns `InvalidNetwork` otherwise.
pub fn validate_network_id(network: &str) -> Result<(), RecordError> {
    let valid = !network.is_empty()
        && network
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(RecordError::InvalidNetwork(network.to_string()))
    }
}

/// Check that a tenant name is non-blank, has no surrounding whitespace and
/// no control characters.
///
/// # Errors
///
/// Returns `InvalidTenantName` otherwise.
pub fn validate_tenant_name(name: &str) -> Result<(), RecordError> {
    let valid = !name.trim().is_empty()
        && name.trim() == name
        && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(RecordError::InvalidTenantName(name.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Ports Layer
//!
//! What the provisioner and the operator console require of an execution
//! environment. `crate::adapters::SimulatedChain` implements all of them.
//!
//! Every method resolves only after the environment confirmed the
//! operation; a returned error means nothing was applied.

use async_trait::async_trait;
use shared_types::{Address, TenantMetadata, TenantUnits, UnitKind, U256};

use crate::domain::{Confirmation, FactoryError, InitArg, TenantListing, UnitCall, UnitHandle};

// =============================================================================
// UNIT FACTORY
// =============================================================================

/// Construct, attach and wire units.
///
/// ## Implementation Notes
///
/// - `construct` is not idempotent: two calls create two units.
/// - `attach` must not change environment state.
/// - `init` must be refused for a unit that was already initialized.
#[async_trait]
pub trait UnitFactory: Send + Sync {
    /// Identity that submits construct and init operations.
    fn operator(&self) -> Address;

    /// Construct a new unit of `kind`.
    ///
    /// # Returns
    ///
    /// * The fresh address and a handle awaiting its `init`
    async fn construct(
        &self,
        kind: UnitKind,
        args: Vec<InitArg>,
    ) -> Result<(Address, UnitHandle), FactoryError>;

    /// Bind to an existing unit of `kind` at `address`.
    ///
    /// # Errors
    ///
    /// `UnknownUnit` or `KindMismatch` if no such unit exists.
    async fn attach(&self, kind: UnitKind, address: Address) -> Result<UnitHandle, FactoryError>;

    /// Wire a unit with its peer addresses and parameters.
    async fn init(
        &self,
        handle: &UnitHandle,
        args: Vec<InitArg>,
    ) -> Result<Confirmation, FactoryError>;
}

// =============================================================================
// TENANT REGISTRY
// =============================================================================

/// Operations of the shared tenant registry unit.
#[async_trait]
pub trait TenantRegistryUnit: Send + Sync {
    /// Register a tenant's four units under its metadata.
    async fn add_tenant(
        &self,
        actor: Address,
        registry: &UnitHandle,
        units: &TenantUnits,
        metadata: &TenantMetadata,
    ) -> Result<Confirmation, FactoryError>;

    /// Unregister the tenant whose core unit is `core`.
    async fn remove_tenant(
        &self,
        actor: Address,
        registry: &UnitHandle,
        core: Address,
    ) -> Result<Confirmation, FactoryError>;

    /// Registered tenants in registration order.
    async fn list_tenants(&self, registry: &UnitHandle) -> Result<TenantListing, FactoryError>;
}

// =============================================================================
// PAYMENT TOKEN
// =============================================================================

/// Operations of the shared test payment token.
#[async_trait]
pub trait PaymentTokenUnit: Send + Sync {
    /// Create `amount` new tokens for `to`.
    async fn mint(
        &self,
        actor: Address,
        token: &UnitHandle,
        to: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError>;

    /// Move `amount` from `actor` to `to`.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `actor` holds less than `amount`.
    async fn transfer(
        &self,
        actor: Address,
        token: &UnitHandle,
        to: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError>;

    /// Allow `spender` to move up to `amount` of `actor`'s tokens.
    async fn approve(
        &self,
        actor: Address,
        token: &UnitHandle,
        spender: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError>;

    /// Balance of `owner`.
    async fn balance_of(&self, token: &UnitHandle, owner: Address) -> Result<U256, FactoryError>;
}

// =============================================================================
// EXECUTION ENVIRONMENT
// =============================================================================

/// Generic access to the environment for operations the provisioner does
/// not interpret.
#[async_trait]
pub trait ExecutionEnvironment: Send + Sync {
    /// Accounts that may act. The first one is the operator.
    fn accounts(&self) -> Vec<Address>;

    /// Submit an opaque state-changing call to a unit.
    async fn submit(
        &self,
        actor: Address,
        target: &UnitHandle,
        call: UnitCall,
    ) -> Result<Confirmation, FactoryError>;

    /// Evaluate an opaque read-only call against a unit.
    async fn query(
        &self,
        target: &UnitHandle,
        call: UnitCall,
    ) -> Result<serde_json::Value, FactoryError>;

    /// Current environment time, in seconds since the epoch.
    async fn now(&self) -> Result<u64, FactoryError>;

    /// Move the environment clock forward and seal a block.
    async fn advance_time(&self, seconds: u64) -> Result<Confirmation, FactoryError>;
}

//! In-process execution environment.
//!
//! Holds every deployed unit, the tenant registries, the payment token
//! ledger and the clock in one `ChainState`. Each confirmed operation is
//! applied to a copy of the state, optionally written to a snapshot file,
//! and only then swapped in, so a failed operation leaves nothing behind.
//! The copy carries at most `CALL_LOG_LIMIT` call records, so its cost does
//! not grow with the number of operations.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{Address, SharedUnitKind, TenantMetadata, TenantUnits, UnitKind, U256};
use tracing::{debug, info, warn};

use super::faults::{FaultPlan, FaultRule, FaultTarget};
use crate::domain::{
    compute_tx_hash, compute_unit_address, derive_account, CallRecord, Confirmation,
    FactoryError, InitArg, TenantListing, UnitCall, UnitHandle,
};
use crate::ports::{ExecutionEnvironment, PaymentTokenUnit, TenantRegistryUnit, UnitFactory};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Configuration of a `SimulatedChain`.
#[derive(Debug, Clone)]
pub struct SimulatedChainConfig {
    /// Number of deterministic accounts. Account 0 is the operator.
    pub account_count: usize,
    /// Clock value of the genesis block.
    pub genesis_timestamp: u64,
    /// Seconds the clock advances per sealed block.
    pub block_time_secs: u64,
    /// Snapshot file shared between processes, if any.
    pub snapshot_path: Option<PathBuf>,
    /// Simulated wait for each confirmation.
    pub confirmation_delay: Duration,
}

impl Default for SimulatedChainConfig {
    fn default() -> Self {
        Self {
            account_count: 10,
            genesis_timestamp: 1_700_000_000,
            block_time_secs: 1,
            snapshot_path: None,
            confirmation_delay: Duration::ZERO,
        }
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Balances and allowances of a payment token unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    /// Sum of all balances.
    pub total_supply: U256,
    /// Balance per holder.
    pub balances: BTreeMap<Address, U256>,
    /// Allowance per owner, then per spender.
    pub allowances: BTreeMap<Address, BTreeMap<Address, U256>>,
}

impl TokenLedger {
    /// Balance of `owner`, zero if never credited.
    #[must_use]
    pub fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    /// Allowance granted by `owner` to `spender`.
    #[must_use]
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or_default()
    }
}

/// One tenant known to a registry unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Addresses of the tenant's units.
    pub units: TenantUnits,
    /// Tenant metadata as registered.
    pub metadata: TenantMetadata,
}

/// Kind-specific state the environment tracks for a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    /// Opaque unit, only its lifecycle is tracked.
    Plain,
    /// Payment token.
    Token(TokenLedger),
    /// Tenant registry, entries in registration order.
    Registry(Vec<RegistryEntry>),
}

/// A unit as recorded by the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedUnit {
    /// Unit kind.
    pub kind: UnitKind,
    /// Account that constructed it.
    pub deployer: Address,
    /// Constructor arguments.
    pub constructor_args: Vec<InitArg>,
    /// Arguments of the one accepted `init`, if it happened.
    pub init_args: Option<Vec<InitArg>>,
    /// Kind-specific state.
    pub state: UnitState,
}

impl DeployedUnit {
    /// Returns true once `init` has been accepted.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.init_args.is_some()
    }
}

/// Opaque calls kept in the call log; older ones are dropped.
pub const CALL_LOG_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChainState {
    accounts: Vec<Address>,
    nonces: BTreeMap<Address, u64>,
    sequence: u64,
    block_number: u64,
    timestamp: u64,
    units: BTreeMap<Address, DeployedUnit>,
    calls: Vec<CallRecord>,
}

impl ChainState {
    fn genesis(config: &SimulatedChainConfig) -> Self {
        Self {
            accounts: (0..config.account_count).map(derive_account).collect(),
            nonces: BTreeMap::new(),
            sequence: 0,
            block_number: 0,
            timestamp: config.genesis_timestamp,
            units: BTreeMap::new(),
            calls: Vec::new(),
        }
    }

    /// Append `fresh` to the call log and drop the oldest past the limit.
    fn log_calls(&mut self, fresh: Vec<CallRecord>) {
        self.calls.extend(fresh);
        let excess = self.calls.len().saturating_sub(CALL_LOG_LIMIT);
        self.calls.drain(..excess);
    }

    fn nonce_of(&self, account: Address) -> u64 {
        self.nonces.get(&account).copied().unwrap_or_default()
    }

    fn require_account(&self, account: Address) -> Result<(), FactoryError> {
        if self.accounts.contains(&account) {
            Ok(())
        } else {
            Err(FactoryError::UnknownAccount(account))
        }
    }

    fn unit(&self, address: Address, kind: UnitKind) -> Result<&DeployedUnit, FactoryError> {
        let unit = self
            .units
            .get(&address)
            .ok_or(FactoryError::UnknownUnit { kind, address })?;
        if unit.kind != kind {
            return Err(FactoryError::KindMismatch {
                address,
                expected: kind,
                found: unit.kind,
            });
        }
        Ok(unit)
    }

    fn unit_mut(
        &mut self,
        address: Address,
        kind: UnitKind,
    ) -> Result<&mut DeployedUnit, FactoryError> {
        self.unit(address, kind)?;
        self.units
            .get_mut(&address)
            .ok_or(FactoryError::UnknownUnit { kind, address })
    }

    fn ledger(&self, token: &UnitHandle) -> Result<&TokenLedger, FactoryError> {
        match &self.unit(token.address(), SharedUnitKind::PaymentToken.into())?.state {
            UnitState::Token(ledger) => Ok(ledger),
            _ => Err(FactoryError::Environment(format!(
                "payment token {} has no ledger",
                token.address()
            ))),
        }
    }

    fn ledger_mut(&mut self, token: &UnitHandle) -> Result<&mut TokenLedger, FactoryError> {
        let address = token.address();
        match &mut self
            .unit_mut(address, SharedUnitKind::PaymentToken.into())?
            .state
        {
            UnitState::Token(ledger) => Ok(ledger),
            _ => Err(FactoryError::Environment(format!(
                "payment token {address} has no ledger"
            ))),
        }
    }

    fn registry(&self, registry: &UnitHandle) -> Result<&Vec<RegistryEntry>, FactoryError> {
        match &self
            .unit(registry.address(), SharedUnitKind::TenantRegistry.into())?
            .state
        {
            UnitState::Registry(entries) => Ok(entries),
            _ => Err(FactoryError::Environment(format!(
                "registry {} has no tenant table",
                registry.address()
            ))),
        }
    }

    fn registry_mut(
        &mut self,
        registry: &UnitHandle,
    ) -> Result<&mut Vec<RegistryEntry>, FactoryError> {
        let address = registry.address();
        match &mut self
            .unit_mut(address, SharedUnitKind::TenantRegistry.into())?
            .state
        {
            UnitState::Registry(entries) => Ok(entries),
            _ => Err(FactoryError::Environment(format!(
                "registry {address} has no tenant table"
            ))),
        }
    }

    /// Consume one nonce of `actor` and seal a block.
    fn seal(&mut self, actor: Address, block_time: u64) -> Confirmation {
        let nonce = self.nonce_of(actor);
        self.nonces.insert(actor, nonce + 1);
        self.sequence += 1;
        self.block_number += 1;
        self.timestamp = self.timestamp.saturating_add(block_time);
        Confirmation {
            tx_hash: compute_tx_hash(actor, nonce, self.sequence),
            block_number: self.block_number,
        }
    }
}

// =============================================================================
// SIMULATED CHAIN
// =============================================================================

/// In-process execution environment implementing every factory port.
#[derive(Debug)]
pub struct SimulatedChain {
    config: SimulatedChainConfig,
    state: Mutex<ChainState>,
    faults: FaultPlan,
    operator: Address,
}

impl SimulatedChain {
    /// Open an environment, resuming from the snapshot file if one exists.
    ///
    /// # Errors
    ///
    /// `Environment` if the snapshot is unreadable or no account exists.
    pub fn open(config: SimulatedChainConfig) -> Result<Self, FactoryError> {
        let state = match &config.snapshot_path {
            Some(path) if path.exists() => {
                let text = fs::read_to_string(path).map_err(|e| snapshot_error(path, &e))?;
                let mut state: ChainState =
                    serde_json::from_str(&text).map_err(|e| snapshot_error(path, &e))?;
                state.log_calls(Vec::new());
                info!(
                    block = state.block_number,
                    units = state.units.len(),
                    "[mp-02] Resumed simulated chain from {}",
                    path.display()
                );
                if state.accounts.len() != config.account_count {
                    warn!(
                        snapshot = state.accounts.len(),
                        configured = config.account_count,
                        "[mp-02] Ignoring configured account count for resumed snapshot"
                    );
                }
                state
            }
            _ => {
                info!(
                    accounts = config.account_count,
                    "[mp-02] Starting simulated chain from genesis"
                );
                ChainState::genesis(&config)
            }
        };

        let operator = state
            .accounts
            .first()
            .copied()
            .ok_or_else(|| FactoryError::Environment("no accounts configured".to_string()))?;

        Ok(Self {
            config,
            state: Mutex::new(state),
            faults: FaultPlan::default(),
            operator,
        })
    }

    /// Fresh environment with default configuration and no snapshot file.
    #[must_use]
    pub fn in_memory() -> Self {
        let config = SimulatedChainConfig::default();
        let state = ChainState::genesis(&config);
        Self {
            config,
            state: Mutex::new(state),
            faults: FaultPlan::default(),
            operator: derive_account(0),
        }
    }

    /// Make the next operation matching `rule` fail.
    pub fn inject_fault(&self, rule: FaultRule) {
        debug!(fault = ?rule.target, "[mp-02] Fault armed");
        self.faults.push(rule);
    }

    /// Number of armed faults not yet triggered.
    pub fn pending_faults(&self) -> usize {
        self.faults.pending()
    }

    /// The unit at `address`, if any.
    pub fn unit(&self, address: Address) -> Option<DeployedUnit> {
        self.state.lock().units.get(&address).cloned()
    }

    /// Number of units ever constructed.
    pub fn unit_count(&self) -> usize {
        self.state.lock().units.len()
    }

    /// Addresses of every unit of `kind`, in address order.
    pub fn units_of_kind(&self, kind: impl Into<UnitKind>) -> Vec<Address> {
        let kind = kind.into();
        self.state
            .lock()
            .units
            .iter()
            .filter(|(_, unit)| unit.kind == kind)
            .map(|(address, _)| *address)
            .collect()
    }

    /// Latest sealed block.
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    /// The most recent opaque calls, oldest first, at most `CALL_LOG_LIMIT`.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    /// Snapshot file, if configured.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.config.snapshot_path.as_deref()
    }

    fn read<T>(
        &self,
        view: impl FnOnce(&ChainState) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        view(&self.state.lock())
    }

    /// Apply `apply` to a copy of the state and seal it as `actor`'s operation.
    ///
    /// The live state is replaced only after the snapshot (if any) is written.
    fn commit<T>(
        &self,
        actor: Address,
        apply: impl FnOnce(&mut ChainState) -> Result<T, FactoryError>,
    ) -> Result<(T, Confirmation), FactoryError> {
        let mut state = self.state.lock();
        state.require_account(actor)?;

        let history = std::mem::take(&mut state.calls);
        let mut next = state.clone();
        state.calls = history;

        let value = apply(&mut next)?;
        let confirmation = next.seal(actor, self.config.block_time_secs);
        let fresh = std::mem::take(&mut next.calls);
        next.calls = state.calls.clone();
        next.log_calls(fresh);

        if let Some(path) = &self.config.snapshot_path {
            write_snapshot(path, &next)?;
        }
        *state = next;
        Ok((value, confirmation))
    }

    /// Wait for the environment to confirm. Never called with the state locked.
    async fn settle(&self) {
        if self.config.confirmation_delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.config.confirmation_delay).await;
        }
    }
}

fn snapshot_error(path: &Path, err: &dyn std::fmt::Display) -> FactoryError {
    FactoryError::Environment(format!("snapshot {}: {err}", path.display()))
}

fn write_snapshot(path: &Path, state: &ChainState) -> Result<(), FactoryError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| snapshot_error(parent, &e))?;
    }
    let bytes = serde_json::to_vec_pretty(state).map_err(|e| snapshot_error(path, &e))?;

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).map_err(|e| snapshot_error(&temp_path, &e))?;
    file.write_all(&bytes)
        .map_err(|e| snapshot_error(&temp_path, &e))?;
    file.sync_all().map_err(|e| snapshot_error(&temp_path, &e))?;

    fs::rename(&temp_path, path).map_err(|e| snapshot_error(path, &e))
}

// =============================================================================
// PORT IMPLEMENTATIONS
// =============================================================================

#[async_trait]
impl UnitFactory for SimulatedChain {
    fn operator(&self) -> Address {
        self.operator
    }

    async fn construct(
        &self,
        kind: UnitKind,
        args: Vec<InitArg>,
    ) -> Result<(Address, UnitHandle), FactoryError> {
        self.faults
            .trip(FaultTarget::Construct(kind), &format!("construct {kind}"))?;

        let deployer = self.operator;
        let (address, confirmation) = self.commit(deployer, |state| {
            let address = compute_unit_address(deployer, state.nonce_of(deployer));
            if state.units.contains_key(&address) {
                return Err(FactoryError::Environment(format!(
                    "address {address} already occupied"
                )));
            }
            let unit_state = match kind {
                UnitKind::Shared(SharedUnitKind::PaymentToken) => {
                    UnitState::Token(TokenLedger::default())
                }
                UnitKind::Shared(SharedUnitKind::TenantRegistry) => UnitState::Registry(Vec::new()),
                _ => UnitState::Plain,
            };
            state.units.insert(
                address,
                DeployedUnit {
                    kind,
                    deployer,
                    constructor_args: args,
                    init_args: None,
                    state: unit_state,
                },
            );
            Ok(address)
        })?;
        self.settle().await;

        debug!(
            unit = %kind,
            artifact = kind.artifact(),
            address = %address,
            block = confirmation.block_number,
            "[mp-02] Unit constructed"
        );
        Ok((address, UnitHandle::bind(kind, address)))
    }

    async fn attach(&self, kind: UnitKind, address: Address) -> Result<UnitHandle, FactoryError> {
        self.read(|state| state.unit(address, kind).map(|_| ()))?;
        self.settle().await;
        debug!(unit = %kind, address = %address, "[mp-02] Attached");
        Ok(UnitHandle::bind(kind, address))
    }

    async fn init(
        &self,
        handle: &UnitHandle,
        args: Vec<InitArg>,
    ) -> Result<Confirmation, FactoryError> {
        let kind = handle.kind();
        self.faults
            .trip(FaultTarget::Init(kind), &format!("init {kind}"))?;

        let arg_count = args.len();
        let ((), confirmation) = self.commit(self.operator, |state| {
            let unit = state.unit_mut(handle.address(), kind)?;
            if unit.is_initialized() {
                return Err(FactoryError::AlreadyInitialized {
                    kind,
                    address: handle.address(),
                });
            }
            unit.init_args = Some(args);
            Ok(())
        })?;
        self.settle().await;

        debug!(
            unit = %kind,
            address = %handle.address(),
            args = arg_count,
            "[mp-02] Unit initialized"
        );
        Ok(confirmation)
    }
}

#[async_trait]
impl TenantRegistryUnit for SimulatedChain {
    async fn add_tenant(
        &self,
        actor: Address,
        registry: &UnitHandle,
        units: &TenantUnits,
        metadata: &TenantMetadata,
    ) -> Result<Confirmation, FactoryError> {
        self.faults.trip(FaultTarget::AddTenant, "add tenant")?;

        let ((), confirmation) = self.commit(actor, |state| {
            let entries = state.registry_mut(registry)?;
            if entries.iter().any(|entry| entry.units.core == units.core) {
                return Err(FactoryError::rejected(
                    "add tenant",
                    format!("core {} already registered", units.core),
                ));
            }
            entries.push(RegistryEntry {
                units: *units,
                metadata: metadata.clone(),
            });
            Ok(())
        })?;
        self.settle().await;

        debug!(tenant = %metadata.name, core = %units.core, "[mp-02] Tenant registered");
        Ok(confirmation)
    }

    async fn remove_tenant(
        &self,
        actor: Address,
        registry: &UnitHandle,
        core: Address,
    ) -> Result<Confirmation, FactoryError> {
        self.faults.trip(FaultTarget::RemoveTenant, "remove tenant")?;

        let (removed, confirmation) = self.commit(actor, |state| {
            let entries = state.registry_mut(registry)?;
            let index = entries
                .iter()
                .position(|entry| entry.units.core == core)
                .ok_or_else(|| {
                    FactoryError::rejected("remove tenant", format!("{core} is not registered"))
                })?;
            Ok(entries.remove(index))
        })?;
        self.settle().await;

        debug!(tenant = %removed.metadata.name, core = %core, "[mp-02] Tenant removed");
        Ok(confirmation)
    }

    async fn list_tenants(&self, registry: &UnitHandle) -> Result<TenantListing, FactoryError> {
        let listing = self.read(|state| {
            let entries = state.registry(registry)?;
            Ok(TenantListing {
                addresses: entries.iter().map(|entry| entry.units.core).collect(),
                names: entries
                    .iter()
                    .map(|entry| entry.metadata.name.clone())
                    .collect(),
            })
        })?;
        self.settle().await;
        Ok(listing)
    }
}

#[async_trait]
impl PaymentTokenUnit for SimulatedChain {
    async fn mint(
        &self,
        actor: Address,
        token: &UnitHandle,
        to: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError> {
        let ((), confirmation) = self.commit(actor, |state| {
            let ledger = state.ledger_mut(token)?;
            let supply = ledger
                .total_supply
                .checked_add(amount)
                .ok_or_else(|| FactoryError::rejected("mint", "total supply overflow"))?;
            let balance = ledger.balance(to).saturating_add(amount);
            ledger.total_supply = supply;
            ledger.balances.insert(to, balance);
            Ok(())
        })?;
        self.settle().await;

        debug!(to = %to, amount = %amount, "[mp-02] Minted");
        Ok(confirmation)
    }

    async fn transfer(
        &self,
        actor: Address,
        token: &UnitHandle,
        to: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError> {
        let ((), confirmation) = self.commit(actor, |state| {
            let ledger = state.ledger_mut(token)?;
            let available = ledger.balance(actor);
            if available < amount {
                return Err(FactoryError::InsufficientBalance {
                    owner: actor,
                    required: amount,
                    available,
                });
            }
            ledger.balances.insert(actor, available - amount);
            let credited = ledger.balance(to).saturating_add(amount);
            ledger.balances.insert(to, credited);
            Ok(())
        })?;
        self.settle().await;

        debug!(from = %actor, to = %to, amount = %amount, "[mp-02] Transferred");
        Ok(confirmation)
    }

    async fn approve(
        &self,
        actor: Address,
        token: &UnitHandle,
        spender: Address,
        amount: U256,
    ) -> Result<Confirmation, FactoryError> {
        let ((), confirmation) = self.commit(actor, |state| {
            state
                .ledger_mut(token)?
                .allowances
                .entry(actor)
                .or_default()
                .insert(spender, amount);
            Ok(())
        })?;
        self.settle().await;

        debug!(owner = %actor, spender = %spender, amount = %amount, "[mp-02] Approved");
        Ok(confirmation)
    }

    async fn balance_of(&self, token: &UnitHandle, owner: Address) -> Result<U256, FactoryError> {
        let balance = self.read(|state| Ok(state.ledger(token)?.balance(owner)))?;
        self.settle().await;
        Ok(balance)
    }
}

#[async_trait]
impl ExecutionEnvironment for SimulatedChain {
    fn accounts(&self) -> Vec<Address> {
        self.state.lock().accounts.clone()
    }

    async fn submit(
        &self,
        actor: Address,
        target: &UnitHandle,
        call: UnitCall,
    ) -> Result<Confirmation, FactoryError> {
        let method = call.method.clone();
        let ((), confirmation) = self.commit(actor, |state| {
            state.unit(target.address(), target.kind())?;
            let block_number = state.block_number + 1;
            state.calls.push(CallRecord {
                actor,
                target: target.address(),
                call,
                block_number,
            });
            Ok(())
        })?;
        self.settle().await;

        debug!(unit = %target, method = %method, "[mp-02] Call confirmed");
        Ok(confirmation)
    }

    async fn query(
        &self,
        target: &UnitHandle,
        call: UnitCall,
    ) -> Result<serde_json::Value, FactoryError> {
        let answer = self.read(|state| {
            let unit = state.unit(target.address(), target.kind())?;
            Ok(json!({
                "unit": target.address(),
                "artifact": unit.kind.artifact(),
                "initialized": unit.is_initialized(),
                "method": call.method,
                "args": call.args,
                "block": state.block_number,
                "timestamp": state.timestamp,
            }))
        })?;
        self.settle().await;
        Ok(answer)
    }

    async fn now(&self) -> Result<u64, FactoryError> {
        let now = self.read(|state| Ok(state.timestamp))?;
        self.settle().await;
        Ok(now)
    }

    async fn advance_time(&self, seconds: u64) -> Result<Confirmation, FactoryError> {
        let (timestamp, confirmation) = self.commit(self.operator, |state| {
            state.timestamp = state.timestamp.saturating_add(seconds);
            Ok(state.timestamp)
        })?;
        self.settle().await;

        info!(seconds, timestamp, "[mp-02] Clock advanced");
        Ok(confirmation)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::TenantUnitKind;

    fn core() -> UnitKind {
        TenantUnitKind::Core.into()
    }

    fn metadata(name: &str) -> TenantMetadata {
        TenantMetadata {
            name: name.to_string(),
            description: "Stable_Coin_Pool".to_string(),
            payment_token_symbol: "USDT".to_string(),
            protection_type: "DePeg Safety".to_string(),
            network: "Arbitrum".to_string(),
        }
    }

    fn units(seed: u8) -> TenantUnits {
        TenantUnits {
            core: Address::new([seed; 20]),
            certificate_issuer: Address::new([seed + 1; 20]),
            policy_issuer: Address::new([seed + 2; 20]),
            epoch_manager: Address::new([seed + 3; 20]),
        }
    }

    async fn registry(chain: &SimulatedChain) -> UnitHandle {
        chain
            .construct(SharedUnitKind::TenantRegistry.into(), vec![])
            .await
            .unwrap()
            .1
    }

    async fn token(chain: &SimulatedChain) -> UnitHandle {
        chain
            .construct(
                SharedUnitKind::PaymentToken.into(),
                vec!["TQA".into(), "TQA".into()],
            )
            .await
            .unwrap()
            .1
    }

    #[tokio::test]
    async fn test_construct_allocates_fresh_addresses() {
        let chain = SimulatedChain::in_memory();
        let (a, _) = chain.construct(core(), vec![]).await.unwrap();
        let (b, _) = chain.construct(core(), vec![]).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(a, compute_unit_address(chain.operator(), 0));
        assert_eq!(b, compute_unit_address(chain.operator(), 1));
        assert_eq!(chain.unit_count(), 2);
    }

    #[tokio::test]
    async fn test_attach_has_no_side_effect() {
        let chain = SimulatedChain::in_memory();
        let (address, _) = chain.construct(core(), vec![]).await.unwrap();
        let block = chain.block_number();

        let handle = chain.attach(core(), address).await.unwrap();
        assert_eq!(handle.address(), address);
        assert_eq!(chain.block_number(), block);
        assert_eq!(chain.unit_count(), 1);
    }

    #[tokio::test]
    async fn test_attach_checks_existence_and_kind() {
        let chain = SimulatedChain::in_memory();
        let (address, _) = chain.construct(core(), vec![]).await.unwrap();

        let wrong_kind = chain
            .attach(TenantUnitKind::PolicyIssuer.into(), address)
            .await;
        assert!(matches!(wrong_kind, Err(FactoryError::KindMismatch { .. })));

        let missing = chain.attach(core(), Address::new([9; 20])).await;
        assert!(matches!(missing, Err(FactoryError::UnknownUnit { .. })));
    }

    #[tokio::test]
    async fn test_init_is_accepted_once() {
        let chain = SimulatedChain::in_memory();
        let (address, handle) = chain.construct(core(), vec![]).await.unwrap();

        chain
            .init(&handle, vec![Address::new([1; 20]).into()])
            .await
            .unwrap();
        let second = chain.init(&handle, vec![]).await;

        assert!(matches!(second, Err(FactoryError::AlreadyInitialized { .. })));
        let unit = chain.unit(address).unwrap();
        assert_eq!(unit.init_args, Some(vec![InitArg::Address(Address::new([1; 20]))]));
    }

    #[tokio::test]
    async fn test_registry_add_list_remove() {
        let chain = SimulatedChain::in_memory();
        let registry = registry(&chain).await;
        let operator = chain.operator();

        chain
            .add_tenant(operator, &registry, &units(1), &metadata("Pool-A"))
            .await
            .unwrap();
        chain
            .add_tenant(operator, &registry, &units(10), &metadata("Pool-B"))
            .await
            .unwrap();

        let listing = chain.list_tenants(&registry).await.unwrap();
        assert_eq!(listing.names, vec!["Pool-A", "Pool-B"]);
        assert_eq!(listing.addresses, vec![units(1).core, units(10).core]);

        chain
            .remove_tenant(operator, &registry, units(1).core)
            .await
            .unwrap();
        let listing = chain.list_tenants(&registry).await.unwrap();
        assert_eq!(listing.names, vec!["Pool-B"]);
    }

    #[tokio::test]
    async fn test_registry_rejects_duplicate_and_unknown() {
        let chain = SimulatedChain::in_memory();
        let registry = registry(&chain).await;
        let operator = chain.operator();

        chain
            .add_tenant(operator, &registry, &units(1), &metadata("Pool-A"))
            .await
            .unwrap();
        let duplicate = chain
            .add_tenant(operator, &registry, &units(1), &metadata("Pool-A2"))
            .await;
        assert!(matches!(duplicate, Err(FactoryError::Rejected { .. })));

        let unknown = chain
            .remove_tenant(operator, &registry, Address::new([0xee; 20]))
            .await;
        assert!(matches!(unknown, Err(FactoryError::Rejected { .. })));
        assert_eq!(chain.list_tenants(&registry).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_token_ledger() {
        let chain = SimulatedChain::in_memory();
        let token = token(&chain).await;
        let accounts = chain.accounts();
        let (alice, bob) = (accounts[0], accounts[1]);

        chain
            .mint(alice, &token, alice, U256::from(100))
            .await
            .unwrap();
        chain
            .transfer(alice, &token, bob, U256::from(40))
            .await
            .unwrap();

        assert_eq!(chain.balance_of(&token, alice).await.unwrap(), U256::from(60));
        assert_eq!(chain.balance_of(&token, bob).await.unwrap(), U256::from(40));

        let overdraw = chain.transfer(bob, &token, alice, U256::from(41)).await;
        assert!(matches!(
            overdraw,
            Err(FactoryError::InsufficientBalance { .. })
        ));
        assert_eq!(chain.balance_of(&token, bob).await.unwrap(), U256::from(40));
    }

    #[tokio::test]
    async fn test_approve_records_allowance() {
        let chain = SimulatedChain::in_memory();
        let token = token(&chain).await;
        let owner = chain.operator();
        let spender = Address::new([7; 20]);

        chain
            .approve(owner, &token, spender, U256::from(5))
            .await
            .unwrap();

        match chain.unit(token.address()).unwrap().state {
            UnitState::Token(ledger) => {
                assert_eq!(ledger.allowance(owner, spender), U256::from(5));
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_actor_rejected() {
        let chain = SimulatedChain::in_memory();
        let token = token(&chain).await;
        let stranger = Address::new([0x42; 20]);

        let result = chain.mint(stranger, &token, stranger, U256::one()).await;
        assert_eq!(result, Err(FactoryError::UnknownAccount(stranger)));
    }

    #[tokio::test]
    async fn test_fault_fails_once_without_effect() {
        let chain = SimulatedChain::in_memory();
        chain.inject_fault(FaultRule::construct(TenantUnitKind::Core));

        let failed = chain.construct(core(), vec![]).await;
        assert!(matches!(failed, Err(FactoryError::Rejected { .. })));
        assert_eq!(chain.unit_count(), 0);
        assert_eq!(chain.block_number(), 0);

        assert!(chain.construct(core(), vec![]).await.is_ok());
        assert_eq!(chain.pending_faults(), 0);
    }

    #[tokio::test]
    async fn test_submit_and_query() {
        let chain = SimulatedChain::in_memory();
        let (address, handle) = chain.construct(core(), vec![]).await.unwrap();
        let actor = chain.accounts()[2];

        let confirmation = chain
            .submit(actor, &handle, UnitCall::new("providerEntrance").arg(10u64))
            .await
            .unwrap();

        let calls = chain.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].actor, actor);
        assert_eq!(calls[0].target, address);
        assert_eq!(calls[0].block_number, confirmation.block_number);

        let answer = chain
            .query(&handle, UnitCall::new("getRewards"))
            .await
            .unwrap();
        assert_eq!(answer["method"], "getRewards");
        assert_eq!(answer["artifact"], "MetaDefender");
    }

    #[tokio::test]
    async fn test_advance_time() {
        let chain = SimulatedChain::in_memory();
        let before = chain.now().await.unwrap();
        chain.advance_time(86_400).await.unwrap();
        let after = chain.now().await.unwrap();
        assert!(after >= before + 86_400);
    }

    #[tokio::test]
    async fn test_snapshot_is_shared_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimulatedChainConfig {
            snapshot_path: Some(dir.path().join("chain").join("state.json")),
            ..SimulatedChainConfig::default()
        };

        let first = SimulatedChain::open(config.clone()).unwrap();
        let token = token(&first).await;
        first
            .mint(first.operator(), &token, first.operator(), U256::from(3))
            .await
            .unwrap();
        drop(first);

        let second = SimulatedChain::open(config).unwrap();
        let handle = second
            .attach(SharedUnitKind::PaymentToken.into(), token.address())
            .await
            .unwrap();
        assert_eq!(
            second.balance_of(&handle, second.operator()).await.unwrap(),
            U256::from(3)
        );

        // Next construct continues from the persisted nonce
        let (next, _) = second.construct(core(), vec![]).await.unwrap();
        assert_eq!(next, compute_unit_address(second.operator(), 2));
    }

    #[tokio::test]
    async fn test_call_log_keeps_most_recent() {
        let chain = SimulatedChain::in_memory();
        let (_, handle) = chain.construct(core(), vec![]).await.unwrap();
        let total = CALL_LOG_LIMIT as u64 + 5;
        for seq in 0..total {
            chain
                .submit(chain.operator(), &handle, UnitCall::new("ping").arg(seq))
                .await
                .unwrap();
        }

        let calls = chain.calls();
        assert_eq!(calls.len(), CALL_LOG_LIMIT);
        assert_eq!(calls[0].call.args, vec![InitArg::from(5u64)]);
        assert_eq!(
            calls[CALL_LOG_LIMIT - 1].call.args,
            vec![InitArg::from(total - 1)]
        );
    }

    #[tokio::test]
    async fn test_resumed_snapshot_keeps_its_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let small = SimulatedChainConfig {
            account_count: 3,
            snapshot_path: Some(path.clone()),
            ..SimulatedChainConfig::default()
        };
        let first = SimulatedChain::open(small).unwrap();
        first.construct(core(), vec![]).await.unwrap();
        drop(first);

        let resumed = SimulatedChain::open(SimulatedChainConfig {
            account_count: 10,
            snapshot_path: Some(path),
            ..SimulatedChainConfig::default()
        })
        .unwrap();
        assert_eq!(resumed.accounts().len(), 3);
        assert_eq!(resumed.unit_count(), 1);
    }

    #[test]
    fn test_open_without_accounts_fails() {
        let config = SimulatedChainConfig {
            account_count: 0,
            ..SimulatedChainConfig::default()
        };
        assert!(matches!(
            SimulatedChain::open(config),
            Err(FactoryError::Environment(_))
        ));
    }
}

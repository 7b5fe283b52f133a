//! # Action Dispatch Table
//!
//! Every menu action is one `ActionEntry`: the input it needs and a pure
//! handler. The console gathers and validates the input through its prompt,
//! calls the handler with the session, and performs the returned plan
//! against the environment.
//!
//! ```text
//! ConsoleAction -> ActionEntry { input, handler }
//!                        |          |
//!              Prompt -> ActionInput -> handler(&Session, ActionInput) -> ActionPlan
//! ```

use mp_02_unit_factory::{UnitCall, UnitHandle};
use shared_types::{Address, TenantMetadata, TenantUnits, DECIMALS, U256};

use super::action::ConsoleAction;
use super::errors::ActionError;
use super::session::Session;

/// Tokens minted by "Give Me Some Test Token".
pub const TEST_TOKEN_MINT: u64 = 10_000;

/// Allowance granted to the core unit by "Approve".
pub const CORE_ALLOWANCE: u64 = 99_999_999;

/// Seconds skipped by "Time Travel".
pub const TIME_TRAVEL_SECS: u64 = 86_400;

/// `amount` whole tokens in base units.
#[must_use]
pub fn whole_tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(DECIMALS)
}

// =============================================================================
// INPUT
// =============================================================================

/// Input an action asks the operator for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Nothing.
    None,
    /// A certificate or policy id, asked with this question.
    Id(&'static str),
    /// A deposit amount in the market's payment token.
    Deposit,
    /// A coverage amount and a duration in days.
    Coverage,
    /// An amount and a recipient account.
    Transfer,
    /// One of the session accounts.
    Account,
    /// One market from the registry unit's listing.
    ListedTenant,
}

/// Validated operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionInput {
    /// Nothing was asked.
    None,
    /// Certificate or policy id.
    Id(u64),
    /// Token amount in base units.
    Amount(U256),
    /// Coverage amount in base units and duration in days.
    Coverage {
        /// Covered amount.
        amount: U256,
        /// Duration in days.
        days: u64,
    },
    /// Transfer amount and recipient.
    Transfer {
        /// Amount in base units.
        amount: U256,
        /// Recipient.
        to: Address,
    },
    /// An account.
    Account(Address),
    /// A listed market.
    ListedTenant {
        /// Listed name.
        name: String,
        /// Listed core address.
        core: Address,
    },
}

// =============================================================================
// PLAN
// =============================================================================

/// One environment interaction, with how its result is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a line; no environment call.
    Say(String),
    /// Read-only unit call, shown as `<label>: <result>`.
    Query {
        /// Result label.
        label: &'static str,
        /// Unit queried.
        target: UnitHandle,
        /// Call.
        call: UnitCall,
    },
    /// State-changing unit call.
    Submit {
        /// What is confirmed.
        label: String,
        /// Unit called.
        target: UnitHandle,
        /// Call.
        call: UnitCall,
    },
    /// Payment token balance, shown with the token symbol.
    Balance {
        /// Token unit.
        token: UnitHandle,
        /// Account queried.
        owner: Address,
        /// Symbol shown.
        symbol: String,
    },
    /// Mint payment tokens.
    Mint {
        /// What is confirmed.
        label: String,
        /// Token unit.
        token: UnitHandle,
        /// Recipient.
        to: Address,
        /// Amount in base units.
        amount: U256,
    },
    /// Grant an allowance.
    Approve {
        /// What is confirmed.
        label: String,
        /// Token unit.
        token: UnitHandle,
        /// Spender.
        spender: Address,
        /// Amount in base units.
        amount: U256,
    },
    /// Move payment tokens.
    Transfer {
        /// What is confirmed.
        label: String,
        /// Token unit.
        token: UnitHandle,
        /// Recipient.
        to: Address,
        /// Amount in base units.
        amount: U256,
    },
    /// Show the registry unit's listing.
    ListTenants {
        /// Registry unit.
        registry: UnitHandle,
    },
    /// List a market in the registry unit.
    AddTenant {
        /// What is confirmed.
        label: String,
        /// Registry unit.
        registry: UnitHandle,
        /// Market units.
        units: TenantUnits,
        /// Market metadata.
        metadata: TenantMetadata,
    },
    /// Delist a market.
    RemoveTenant {
        /// What is confirmed.
        label: String,
        /// Registry unit.
        registry: UnitHandle,
        /// Core address of the market.
        core: Address,
    },
    /// Show the environment clock.
    Now,
    /// Move the environment clock forward.
    AdvanceTime(u64),
}

/// What a handler decided: effects in order, then session changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlan {
    /// Identity submitting state-changing effects.
    pub actor: Address,
    /// Effects, performed in order; the first failure stops the rest.
    pub effects: Vec<Effect>,
    /// New acting identity.
    pub switch_to: Option<Address>,
    /// True if the console should stop.
    pub exit: bool,
}

impl ActionPlan {
    fn acting(session: &Session) -> Self {
        Self {
            actor: session.acting,
            ..Self::default()
        }
    }

    fn then(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

// =============================================================================
// TABLE
// =============================================================================

/// Turns validated input into a plan. Never touches the environment.
pub type Handler = fn(&Session, ActionInput) -> Result<ActionPlan, ActionError>;

/// One row of the dispatch table.
#[derive(Clone, Copy)]
pub struct ActionEntry {
    /// Menu action.
    pub action: ConsoleAction,
    /// Input gathered before the handler runs.
    pub input: InputKind,
    /// Handler.
    pub handler: Handler,
}

const fn entry(action: ConsoleAction, input: InputKind, handler: Handler) -> ActionEntry {
    ActionEntry {
        action,
        input,
        handler,
    }
}

/// Every menu action, in menu order.
pub const DISPATCH: &[ActionEntry] = &[
    entry(
        ConsoleAction::QueryRewards,
        InputKind::Id("Which certificate do you want to query?"),
        query_rewards,
    ),
    entry(
        ConsoleAction::ClaimRewards,
        InputKind::Id("Which certificate do you want to claim?"),
        claim_rewards,
    ),
    entry(ConsoleAction::ProvideLiquidity, InputKind::Deposit, provide_liquidity),
    entry(
        ConsoleAction::WithdrawLiquidity,
        InputKind::Id("Which certificate do you want to withdraw?"),
        withdraw_liquidity,
    ),
    entry(ConsoleAction::BuyCoverage, InputKind::Coverage, buy_coverage),
    entry(
        ConsoleAction::SettleCoverage,
        InputKind::Id("Which policy do you want to settle?"),
        settle_coverage,
    ),
    entry(ConsoleAction::QueryAccount, InputKind::None, query_account),
    entry(ConsoleAction::PremiumQuote, InputKind::Coverage, premium_quote),
    entry(ConsoleAction::QueryGlobals, InputKind::None, query_globals),
    entry(ConsoleAction::ListTenants, InputKind::None, list_tenants),
    entry(ConsoleAction::AdvanceTime, InputKind::None, advance_time),
    entry(ConsoleAction::MintTestTokens, InputKind::None, mint_test_tokens),
    entry(ConsoleAction::Approve, InputKind::None, approve),
    entry(ConsoleAction::Transfer, InputKind::Transfer, transfer),
    entry(ConsoleAction::MyAddress, InputKind::None, my_address),
    entry(ConsoleAction::SwitchIdentity, InputKind::Account, switch_identity),
    entry(ConsoleAction::AddTenant, InputKind::None, add_tenant),
    entry(ConsoleAction::RemoveTenant, InputKind::ListedTenant, remove_tenant),
    entry(ConsoleAction::Exit, InputKind::None, exit),
];

/// The table row of `action`.
#[must_use]
pub fn entry_for(action: ConsoleAction) -> Option<&'static ActionEntry> {
    DISPATCH.iter().find(|entry| entry.action == action)
}

// =============================================================================
// HANDLERS
// =============================================================================

fn unexpected(action: ConsoleAction) -> ActionError {
    ActionError::UnexpectedInput(action)
}

fn id_of(input: ActionInput, action: ConsoleAction) -> Result<u64, ActionError> {
    match input {
        ActionInput::Id(id) => Ok(id),
        _ => Err(unexpected(action)),
    }
}

fn coverage_of(input: ActionInput, action: ConsoleAction) -> Result<(U256, u64), ActionError> {
    match input {
        ActionInput::Coverage { amount, days } => Ok((amount, days)),
        _ => Err(unexpected(action)),
    }
}

fn core_submit(session: &Session, label: &str, call: UnitCall) -> Effect {
    Effect::Submit {
        label: label.to_string(),
        target: session.units.tenant.core,
        call,
    }
}

fn query_rewards(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let id = id_of(input, ConsoleAction::QueryRewards)?;
    Ok(ActionPlan::acting(session).then(Effect::Query {
        label: "rewards",
        target: session.units.tenant.core,
        call: UnitCall::new("getRewards").arg(id),
    }))
}

fn claim_rewards(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let id = id_of(input, ConsoleAction::ClaimRewards)?;
    Ok(ActionPlan::acting(session)
        .then(Effect::Query {
            label: "rewards",
            target: session.units.tenant.core,
            call: UnitCall::new("getRewards").arg(id),
        })
        .then(core_submit(
            session,
            "claim",
            UnitCall::new("claimRewards").arg(id),
        )))
}

fn provide_liquidity(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let ActionInput::Amount(amount) = input else {
        return Err(unexpected(ConsoleAction::ProvideLiquidity));
    };
    Ok(ActionPlan::acting(session).then(core_submit(
        session,
        "deposit",
        UnitCall::new("certificateProviderEntrance").arg(amount),
    )))
}

fn withdraw_liquidity(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let id = id_of(input, ConsoleAction::WithdrawLiquidity)?;
    Ok(ActionPlan::acting(session).then(core_submit(
        session,
        "withdrawal",
        UnitCall::new("certificateProviderExit").arg(id),
    )))
}

fn buy_coverage(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let (amount, days) = coverage_of(input, ConsoleAction::BuyCoverage)?;
    Ok(ActionPlan::acting(session).then(core_submit(
        session,
        "policy purchase",
        UnitCall::new("buyPolicy")
            .arg(session.acting)
            .arg(amount)
            .arg(days),
    )))
}

fn settle_coverage(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let id = id_of(input, ConsoleAction::SettleCoverage)?;
    Ok(ActionPlan::acting(session).then(core_submit(
        session,
        "settlement",
        UnitCall::new("settlePolicy").arg(id),
    )))
}

fn query_account(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    let tenant = &session.units.tenant;
    Ok(ActionPlan::acting(session)
        .then(Effect::Balance {
            token: session.units.shared.payment_token,
            owner: session.acting,
            symbol: tenant.descriptor.metadata.payment_token_symbol.clone(),
        })
        .then(Effect::Query {
            label: "certificates",
            target: tenant.certificate_issuer,
            call: UnitCall::new("getLiquidityProviders").arg(session.acting),
        })
        .then(Effect::Query {
            label: "policies",
            target: tenant.policy_issuer,
            call: UnitCall::new("getPolicies").arg(session.acting),
        }))
}

fn premium_quote(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let (amount, days) = coverage_of(input, ConsoleAction::PremiumQuote)?;
    Ok(ActionPlan::acting(session).then(Effect::Query {
        label: "premium",
        target: session.units.shared.globals_viewer,
        call: UnitCall::new("getPremium")
            .arg(amount)
            .arg(days)
            .arg(session.units.tenant.core.address()),
    }))
}

fn query_globals(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan::acting(session).then(Effect::Query {
        label: "globals",
        target: session.units.shared.globals_viewer,
        call: UnitCall::new("getGlobals").arg(session.units.tenant.core.address()),
    }))
}

fn list_tenants(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan::acting(session).then(Effect::ListTenants {
        registry: session.units.shared.registry,
    }))
}

fn advance_time(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan::acting(session)
        .then(Effect::Now)
        .then(Effect::AdvanceTime(TIME_TRAVEL_SECS))
        .then(Effect::Now))
}

fn mint_test_tokens(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan::acting(session).then(Effect::Mint {
        label: format!("mint of {TEST_TOKEN_MINT} tokens"),
        token: session.units.shared.payment_token,
        to: session.acting,
        amount: whole_tokens(TEST_TOKEN_MINT),
    }))
}

fn approve(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    let core = session.units.tenant.core.address();
    Ok(ActionPlan::acting(session).then(Effect::Approve {
        label: format!("allowance for {core}"),
        token: session.units.shared.payment_token,
        spender: core,
        amount: whole_tokens(CORE_ALLOWANCE),
    }))
}

fn transfer(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let ActionInput::Transfer { amount, to } = input else {
        return Err(unexpected(ConsoleAction::Transfer));
    };
    Ok(ActionPlan::acting(session).then(Effect::Transfer {
        label: format!("transfer of {} to {to}", shared_types::format_units(amount)),
        token: session.units.shared.payment_token,
        to,
        amount,
    }))
}

fn my_address(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan::acting(session).then(Effect::Say(session.acting.to_string())))
}

fn switch_identity(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let ActionInput::Account(next) = input else {
        return Err(unexpected(ConsoleAction::SwitchIdentity));
    };
    let mut plan = ActionPlan::acting(session).then(Effect::Say(format!("Now acting as {next}")));
    plan.switch_to = Some(next);
    Ok(plan)
}

fn add_tenant(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    let descriptor = &session.units.tenant.descriptor;
    Ok(ActionPlan::acting(session).then(Effect::AddTenant {
        label: format!("listing of '{}'", descriptor.name()),
        registry: session.units.shared.registry,
        units: descriptor.units,
        metadata: descriptor.metadata.clone(),
    }))
}

fn remove_tenant(session: &Session, input: ActionInput) -> Result<ActionPlan, ActionError> {
    let ActionInput::ListedTenant { name, core } = input else {
        return Err(unexpected(ConsoleAction::RemoveTenant));
    };
    Ok(ActionPlan::acting(session).then(Effect::RemoveTenant {
        label: format!("removal of '{name}'"),
        registry: session.units.shared.registry,
        core,
    }))
}

fn exit(session: &Session, _: ActionInput) -> Result<ActionPlan, ActionError> {
    Ok(ActionPlan {
        exit: true,
        ..ActionPlan::acting(session)
    })
}

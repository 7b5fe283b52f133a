//! # Console Service
//!
//! Opens a session on one recorded market and dispatches menu actions.
//! The registry record is only ever loaded; nothing here saves it.
//!
//! An action runs in three steps: its input is gathered and validated
//! through the prompt, the pure handler from `DISPATCH` turns it into an
//! `ActionPlan`, and the plan's effects are performed against the backend.

use std::sync::Arc;

use mp_01_registry_store::RegistryStore;
use mp_02_unit_factory::{
    Confirmation, ExecutionEnvironment, PaymentTokenUnit, TenantRegistryUnit, UnitFactory,
    UnitHandle,
};
use shared_types::{format_units, Address, SharedUnitKind, TenantUnitKind, UnitKind};
use tracing::{debug, error, info, warn};

use crate::domain::{
    entry_for, parse_amount, parse_days, parse_id, ActionError, ActionInput, ActionOutput,
    ActionPlan, AttachedUnits, ConsoleAction, Effect, InputKind, Session, SharedHandles,
    StartupError, TenantHandles,
};
use crate::prompt::Prompt;

fn confirmed(what: &str, confirmation: &Confirmation) -> String {
    format!(
        "{what} confirmed in block {} (tx {})",
        confirmation.block_number, confirmation.tx_hash
    )
}

/// Query results as pretty JSON.
fn rendered(label: &str, value: &serde_json::Value) -> String {
    let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("{label}: {text}")
}

/// Everything the console calls on the execution environment.
pub trait ConsoleBackend:
    UnitFactory + TenantRegistryUnit + PaymentTokenUnit + ExecutionEnvironment
{
}

impl<T> ConsoleBackend for T where
    T: UnitFactory + TenantRegistryUnit + PaymentTokenUnit + ExecutionEnvironment + ?Sized
{
}

/// Operator console bound to one network.
pub struct Console<B: ConsoleBackend + ?Sized> {
    backend: Arc<B>,
    network: String,
}

impl<B: ConsoleBackend + ?Sized> Console<B> {
    /// Create a console for `network`.
    pub fn new(backend: Arc<B>, network: impl Into<String>) -> Self {
        Self {
            backend,
            network: network.into(),
        }
    }

    /// Load the record, pick a market and attach every unit it needs.
    ///
    /// `market` selects by name; without it the operator is asked.
    ///
    /// # Errors
    ///
    /// Any `StartupError`.
    pub async fn open_session<S: RegistryStore + ?Sized>(
        &self,
        store: &S,
        market: Option<&str>,
        prompt: &mut dyn Prompt,
    ) -> Result<Session, StartupError> {
        let record = store.load(&self.network)?;
        let infra = match (record.shared_infra, record.tenants.is_empty()) {
            (Some(infra), false) => infra,
            _ => return Err(StartupError::NoMarkets(self.network.clone())),
        };

        let descriptor = match market {
            Some(name) => record.find_tenant(name).cloned().ok_or_else(|| {
                StartupError::UnknownMarket {
                    network: self.network.clone(),
                    name: name.to_string(),
                }
            })?,
            None => {
                let names: Vec<String> =
                    record.tenant_names().into_iter().map(String::from).collect();
                let index = prompt
                    .choose("Which market do you want to operate?", &names)
                    .map_err(StartupError::Selection)?;
                record.tenants[index].clone()
            }
        };

        let shared = SharedHandles {
            registry: self
                .attach(SharedUnitKind::TenantRegistry, infra.registry)
                .await?,
            globals_viewer: self
                .attach(SharedUnitKind::GlobalsViewer, infra.globals_viewer)
                .await?,
            payoff_model: self
                .attach(SharedUnitKind::PayoffModel, infra.payoff_model)
                .await?,
            payment_token: self
                .attach(SharedUnitKind::PaymentToken, infra.payment_token)
                .await?,
        };
        let units = descriptor.units;
        let tenant = TenantHandles {
            core: self.attach(TenantUnitKind::Core, units.core).await?,
            certificate_issuer: self
                .attach(TenantUnitKind::CertificateIssuer, units.certificate_issuer)
                .await?,
            policy_issuer: self
                .attach(TenantUnitKind::PolicyIssuer, units.policy_issuer)
                .await?,
            epoch_manager: self
                .attach(TenantUnitKind::EpochManager, units.epoch_manager)
                .await?,
            descriptor,
        };

        let session = Session::new(self.backend.accounts(), AttachedUnits { shared, tenant })
            .ok_or(StartupError::NoAccounts)?;
        info!(
            network = %self.network,
            market = %session.units.tenant.descriptor.name(),
            acting = %session.acting,
            "Console session opened"
        );
        Ok(session)
    }

    async fn attach(
        &self,
        kind: impl Into<UnitKind>,
        address: Address,
    ) -> Result<UnitHandle, StartupError> {
        let kind = kind.into();
        self.backend
            .attach(kind, address)
            .await
            .map_err(|source| StartupError::Attach {
                kind,
                address,
                source,
            })
    }

    /// Menu loop. Returns when the operator exits or input ends. Action
    /// failures are shown and the loop continues.
    pub async fn run(&self, session: &mut Session, prompt: &mut dyn Prompt) {
        prompt.say(&format!(
            "Operating '{}' on {} as {}",
            session.units.tenant.descriptor.name(),
            self.network,
            session.acting
        ));
        loop {
            for line in ConsoleAction::menu() {
                prompt.say(&line);
            }
            let Some(selection) = prompt.ask("What do you want to do?") else {
                break;
            };
            let Some(action) = ConsoleAction::parse(&selection) else {
                prompt.say(&format!("Unknown option '{selection}'"));
                continue;
            };

            match self.execute(action, session, prompt).await {
                Ok(output) => {
                    for line in &output.lines {
                        prompt.say(line);
                    }
                    session.apply(&output);
                    if output.exit {
                        break;
                    }
                }
                Err(ActionError::InputClosed) => break,
                Err(ActionError::Validation(err)) => {
                    warn!(action = %action, error = %err, "Input rejected");
                    prompt.say(&format!("Invalid input: {err}"));
                }
                Err(err) => {
                    error!(action = %action, error = %err, "Action failed");
                    prompt.say(&format!("{action} failed: {err}"));
                }
            }
        }
    }

    /// Run one action against the session.
    ///
    /// # Errors
    ///
    /// `Validation` before anything is submitted, otherwise the failing
    /// environment call.
    pub async fn execute(
        &self,
        action: ConsoleAction,
        session: &Session,
        prompt: &mut dyn Prompt,
    ) -> Result<ActionOutput, ActionError> {
        let entry = entry_for(action).ok_or(ActionError::NoHandler(action))?;
        debug!(action = %action, acting = %session.acting, "Executing console action");
        let input = self.gather(entry.input, session, prompt).await?;
        let plan = (entry.handler)(session, input)?;
        self.perform(plan).await
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    async fn gather(
        &self,
        kind: InputKind,
        session: &Session,
        prompt: &mut dyn Prompt,
    ) -> Result<ActionInput, ActionError> {
        let input = match kind {
            InputKind::None => ActionInput::None,
            InputKind::Id(question) => ActionInput::Id(parse_id(&ask(prompt, question)?)?),
            InputKind::Deposit => {
                let symbol = &session.units.tenant.descriptor.metadata.payment_token_symbol;
                let question = format!("How much {symbol} do you want to provide?");
                ActionInput::Amount(parse_amount(&ask(prompt, &question)?)?)
            }
            InputKind::Coverage => {
                let amount = parse_amount(&ask(prompt, "How much coverage do you want to buy?")?)?;
                let days = parse_days(&ask(prompt, "How long do you want to buy? (in days)")?)?;
                ActionInput::Coverage { amount, days }
            }
            InputKind::Transfer => {
                let amount =
                    parse_amount(&ask(prompt, "How much token do you want to transfer?")?)?;
                let index = prompt.choose(
                    "Which address do you want to send to?",
                    &session.account_choices(),
                )?;
                ActionInput::Transfer {
                    amount,
                    to: session.accounts[index],
                }
            }
            InputKind::Account => {
                let index = prompt.choose(
                    "Which address do you want to act as?",
                    &session.account_choices(),
                )?;
                ActionInput::Account(session.accounts[index])
            }
            InputKind::ListedTenant => {
                let listing = self
                    .backend
                    .list_tenants(&session.units.shared.registry)
                    .await?;
                let index = prompt.choose("Which market do you want to remove?", &listing.names)?;
                ActionInput::ListedTenant {
                    name: listing.names[index].clone(),
                    core: listing.addresses[index],
                }
            }
        };
        Ok(input)
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    async fn perform(&self, plan: ActionPlan) -> Result<ActionOutput, ActionError> {
        let mut output = ActionOutput {
            switch_to: plan.switch_to,
            exit: plan.exit,
            ..ActionOutput::default()
        };
        for effect in plan.effects {
            let lines = self.perform_effect(plan.actor, effect).await?;
            output.lines.extend(lines);
        }
        Ok(output)
    }

    async fn perform_effect(
        &self,
        actor: Address,
        effect: Effect,
    ) -> Result<Vec<String>, ActionError> {
        let line = match effect {
            Effect::Say(line) => line,
            Effect::Query {
                label,
                target,
                call,
            } => rendered(label, &self.backend.query(&target, call).await?),
            Effect::Submit {
                label,
                target,
                call,
            } => confirmed(&label, &self.backend.submit(actor, &target, call).await?),
            Effect::Balance {
                token,
                owner,
                symbol,
            } => {
                let balance = self.backend.balance_of(&token, owner).await?;
                format!("You have the balance of {} {symbol}", format_units(balance))
            }
            Effect::Mint {
                label,
                token,
                to,
                amount,
            } => confirmed(&label, &self.backend.mint(actor, &token, to, amount).await?),
            Effect::Approve {
                label,
                token,
                spender,
                amount,
            } => confirmed(
                &label,
                &self.backend.approve(actor, &token, spender, amount).await?,
            ),
            Effect::Transfer {
                label,
                token,
                to,
                amount,
            } => confirmed(
                &label,
                &self.backend.transfer(actor, &token, to, amount).await?,
            ),
            Effect::ListTenants { registry } => {
                let listing = self.backend.list_tenants(&registry).await?;
                if listing.is_empty() {
                    return Ok(vec!["No market is registered".to_string()]);
                }
                return Ok(listing
                    .names
                    .iter()
                    .zip(&listing.addresses)
                    .map(|(name, core)| format!("{name} {core}"))
                    .collect());
            }
            Effect::AddTenant {
                label,
                registry,
                units,
                metadata,
            } => confirmed(
                &label,
                &self
                    .backend
                    .add_tenant(actor, &registry, &units, &metadata)
                    .await?,
            ),
            Effect::RemoveTenant {
                label,
                registry,
                core,
            } => confirmed(
                &label,
                &self.backend.remove_tenant(actor, &registry, core).await?,
            ),
            Effect::Now => format!("current time is {}", self.backend.now().await?),
            Effect::AdvanceTime(secs) => {
                let confirmation = self.backend.advance_time(secs).await?;
                debug!(secs, block = confirmation.block_number, "Clock advanced");
                return Ok(Vec::new());
            }
        };
        Ok(vec![line])
    }
}

fn ask(prompt: &mut dyn Prompt, question: &str) -> Result<String, ActionError> {
    prompt.ask(question).ok_or(ActionError::InputClosed)
}

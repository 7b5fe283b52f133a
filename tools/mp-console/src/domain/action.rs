//! The console menu.

use std::fmt;

use shared_types::Address;

/// One menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleAction {
    /// Query the rewards accrued by a liquidity certificate.
    QueryRewards,
    /// Claim the rewards of a liquidity certificate.
    ClaimRewards,
    /// Deposit payment tokens and receive a liquidity certificate.
    ProvideLiquidity,
    /// Redeem a liquidity certificate.
    WithdrawLiquidity,
    /// Buy coverage for the acting identity.
    BuyCoverage,
    /// Settle an expired policy.
    SettleCoverage,
    /// Balance, certificates and policies of the acting identity.
    QueryAccount,
    /// Premium for a coverage amount and duration.
    PremiumQuote,
    /// Globals of the market.
    QueryGlobals,
    /// Markets listed by the shared registry unit.
    ListTenants,
    /// Move the environment clock forward one day.
    AdvanceTime,
    /// Mint test payment tokens to the acting identity.
    MintTestTokens,
    /// Let the core unit spend the acting identity's payment tokens.
    Approve,
    /// Send payment tokens to another account.
    Transfer,
    /// Print the acting identity.
    MyAddress,
    /// Act as another account.
    SwitchIdentity,
    /// List the selected market in the shared registry unit.
    AddTenant,
    /// Remove a market from the shared registry unit.
    RemoveTenant,
    /// Leave the console.
    Exit,
}

impl ConsoleAction {
    /// Menu order.
    pub const ALL: [ConsoleAction; 19] = [
        Self::QueryRewards,
        Self::ClaimRewards,
        Self::ProvideLiquidity,
        Self::WithdrawLiquidity,
        Self::BuyCoverage,
        Self::SettleCoverage,
        Self::QueryAccount,
        Self::PremiumQuote,
        Self::QueryGlobals,
        Self::ListTenants,
        Self::AdvanceTime,
        Self::MintTestTokens,
        Self::Approve,
        Self::Transfer,
        Self::MyAddress,
        Self::SwitchIdentity,
        Self::AddTenant,
        Self::RemoveTenant,
        Self::Exit,
    ];

    /// Menu label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::QueryRewards => "Get Rewards",
            Self::ClaimRewards => "Claim Rewards",
            Self::ProvideLiquidity => "Provide Liquidity",
            Self::WithdrawLiquidity => "Liquidity Withdraw",
            Self::BuyCoverage => "Buy Policy",
            Self::SettleCoverage => "Settle Policy",
            Self::QueryAccount => "Query My Account",
            Self::PremiumQuote => "Calculate Premium",
            Self::QueryGlobals => "Query Global Views",
            Self::ListTenants => "List Markets",
            Self::AdvanceTime => "Time Travel",
            Self::MintTestTokens => "Give Me Some Test Token",
            Self::Approve => "Approve",
            Self::Transfer => "Transfer",
            Self::MyAddress => "My Address",
            Self::SwitchIdentity => "Choose Address",
            Self::AddTenant => "Add Market",
            Self::RemoveTenant => "Remove Market",
            Self::Exit => "Exit",
        }
    }

    /// Resolve a menu selection, by 1-based number or by label (case
    /// insensitive).
    #[must_use]
    pub fn parse(selection: &str) -> Option<Self> {
        let text = selection.trim();
        if let Ok(number) = text.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| Self::ALL.get(index).copied());
        }
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(text))
    }

    /// Numbered menu lines.
    #[must_use]
    pub fn menu() -> Vec<String> {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(i, action)| format!("{:>3}) {}", i + 1, action.label()))
            .collect()
    }
}

impl fmt::Display for ConsoleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What an action printed and how it changes the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    /// Lines to show the operator.
    pub lines: Vec<String>,
    /// New acting identity, if the action switched it.
    pub switch_to: Option<Address>,
    /// True if the console should stop.
    pub exit: bool,
}

impl ActionOutput {
    /// Output made of one line.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            ..Self::default()
        }
    }

    /// Append a line.
    #[must_use]
    pub fn with_line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }
}

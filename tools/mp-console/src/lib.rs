//! # MP Console: Market Provisioner Operator Console
//!
//! Terminal client for markets provisioned by `mp-provision`. Reads the
//! registry record of a network, attaches to the recorded units and offers
//! a fixed menu of operations against one market.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   load (read-only)   ┌────────────────────┐
//! │ RegistryStore│ ───────────────────→ │ Console            │
//! └──────────────┘                      │  open_session()    │
//!                                       │  run() ─ menu loop │
//! ┌──────────────┐   attach / submit /  │  execute(action)   │
//! │ Environment  │ ←──── query ──────── │                    │
//! └──────────────┘                      └────────────────────┘
//!                                              ↑ ↓
//!                                       Prompt (stdin / scripted)
//! ```
//!
//! Each action is a row of `DISPATCH`: the input it asks for and a pure
//! handler that reads the `Session` and returns an `ActionPlan`. The console
//! performs the plan and returns an `ActionOutput`; the only session change
//! an action can request is a new acting identity.

pub mod console;
pub mod domain;
pub mod prompt;

pub use console::{Console, ConsoleBackend};
pub use domain::{
    ActionError, ActionOutput, ConsoleAction, Session, StartupError, ValidationError,
    CORE_ALLOWANCE, DISPATCH, TEST_TOKEN_MINT, TIME_TRAVEL_SECS,
};
pub use prompt::{Prompt, ScriptedPrompt, StdinPrompt};

//! Console domain: session state, menu actions, the dispatch table and
//! input validation.

mod action;
mod dispatch;
mod errors;
mod session;
mod validation;

pub use action::{ActionOutput, ConsoleAction};
pub use dispatch::{
    entry_for, whole_tokens, ActionEntry, ActionInput, ActionPlan, Effect, Handler, InputKind,
    CORE_ALLOWANCE, DISPATCH, TEST_TOKEN_MINT, TIME_TRAVEL_SECS,
};
pub use errors::{ActionError, StartupError, ValidationError};
pub use session::{AttachedUnits, Session, SharedHandles, TenantHandles};
pub use validation::{parse_amount, parse_days, parse_id, MAX_DURATION_DAYS};

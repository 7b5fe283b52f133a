//! # Pass State Machine
//!
//! ```text
//! Start ─► SharedInfraResolved ─► TenantConstructed ─► TenantWired ─► TenantRegistered ─► Persisted
//! ```
//!
//! Transitions only move one step forward. Failures leave the machine in
//! the last reached state, which names the step that did not complete.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::ProvisioningError;

/// Progress of one provisioning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProvisioningState {
    /// Nothing done yet.
    Start,
    /// Shared units constructed or attached.
    SharedInfraResolved,
    /// Four per-tenant units constructed.
    TenantConstructed,
    /// Four per-tenant units wired.
    TenantWired,
    /// Tenant added to the shared registry unit.
    TenantRegistered,
    /// Registry record saved. Terminal.
    Persisted,
}

impl ProvisioningState {
    /// The only state reachable from this one.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::SharedInfraResolved),
            Self::SharedInfraResolved => Some(Self::TenantConstructed),
            Self::TenantConstructed => Some(Self::TenantWired),
            Self::TenantWired => Some(Self::TenantRegistered),
            Self::TenantRegistered => Some(Self::Persisted),
            Self::Persisted => None,
        }
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless `next` is the successor of `self`.
    pub fn transition(self, next: Self) -> Result<Self, ProvisioningError> {
        if self.successor() == Some(next) {
            Ok(next)
        } else {
            Err(ProvisioningError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns true for the terminal success state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Persisted
    }

    /// The step that leaves this state, as named in failure reports.
    #[must_use]
    pub fn pending_step(self) -> &'static str {
        match self {
            Self::Start => "resolve shared infrastructure",
            Self::SharedInfraResolved => "construct tenant units",
            Self::TenantConstructed => "wire tenant units",
            Self::TenantWired => "register tenant",
            Self::TenantRegistered => "persist registry record",
            Self::Persisted => "none",
        }
    }
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "Start",
            Self::SharedInfraResolved => "SharedInfraResolved",
            Self::TenantConstructed => "TenantConstructed",
            Self::TenantWired => "TenantWired",
            Self::TenantRegistered => "TenantRegistered",
            Self::Persisted => "Persisted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_walks_every_state() {
        let mut state = ProvisioningState::Start;
        let mut visited = vec![state];
        while let Some(next) = state.successor() {
            state = state.transition(next).unwrap();
            visited.push(state);
        }
        assert_eq!(visited.len(), 6);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_skipping_a_state_is_rejected() {
        let result = ProvisioningState::SharedInfraResolved.transition(ProvisioningState::TenantWired);
        assert!(matches!(
            result,
            Err(ProvisioningError::InvalidTransition {
                from: ProvisioningState::SharedInfraResolved,
                to: ProvisioningState::TenantWired,
            })
        ));
    }

    #[test]
    fn test_no_way_back() {
        assert!(ProvisioningState::TenantWired
            .transition(ProvisioningState::TenantConstructed)
            .is_err());
        assert!(ProvisioningState::Persisted
            .transition(ProvisioningState::Start)
            .is_err());
    }
}

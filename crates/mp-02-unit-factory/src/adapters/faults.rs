use parking_lot::Mutex;
use shared_types::UnitKind;

use crate::domain::FactoryError;

/// Operation a fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultTarget {
    /// `construct` of the given kind.
    Construct(UnitKind),
    /// `init` of the given kind.
    Init(UnitKind),
    /// Any `add_tenant`.
    AddTenant,
    /// Any `remove_tenant`.
    RemoveTenant,
}

/// Makes the next matching operation fail with `Rejected`.
///
/// Rules are consumed by the first operation they match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRule {
    /// Operation to fail.
    pub target: FaultTarget,
    /// Reason reported in the rejection.
    pub reason: String,
}

impl FaultRule {
    /// Fail the next `construct` of `kind`.
    pub fn construct(kind: impl Into<UnitKind>) -> Self {
        Self::new(FaultTarget::Construct(kind.into()))
    }

    /// Fail the next `init` of `kind`.
    pub fn init(kind: impl Into<UnitKind>) -> Self {
        Self::new(FaultTarget::Init(kind.into()))
    }

    /// Fail the next `add_tenant`.
    #[must_use]
    pub fn add_tenant() -> Self {
        Self::new(FaultTarget::AddTenant)
    }

    /// Fail the next `remove_tenant`.
    #[must_use]
    pub fn remove_tenant() -> Self {
        Self::new(FaultTarget::RemoveTenant)
    }

    /// Replace the rejection reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    fn new(target: FaultTarget) -> Self {
        Self {
            target,
            reason: "fault injected".to_string(),
        }
    }
}

/// Pending fault rules, never persisted.
#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    rules: Mutex<Vec<FaultRule>>,
}

impl FaultPlan {
    pub(crate) fn push(&self, rule: FaultRule) {
        self.rules.lock().push(rule);
    }

    /// Consume the first rule matching `target` and turn it into an error.
    pub(crate) fn trip(&self, target: FaultTarget, operation: &str) -> Result<(), FactoryError> {
        let mut rules = self.rules.lock();
        match rules.iter().position(|rule| rule.target == target) {
            Some(index) => {
                let rule = rules.remove(index);
                Err(FactoryError::rejected(operation, rule.reason))
            }
            None => Ok(()),
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.rules.lock().len()
    }
}

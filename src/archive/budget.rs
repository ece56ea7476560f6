//! Budget spent on the currently focused target.

use crate::fitness::TargetId;

#[derive(Debug, Clone, Default)]
pub(crate) struct TargetBudget {
    focused: Option<TargetId>,
    allowed: u64,
    consumed: u64,
}

impl TargetBudget {
    pub(crate) fn focus_on(&mut self, target: TargetId, budget: u64) {
        self.focused = Some(target);
        self.allowed = budget;
        self.consumed = 0;
    }

    pub(crate) fn consume(&mut self, units: u64) {
        if self.focused.is_some() {
            self.consumed = self.consumed.saturating_add(units);
        }
    }

    pub(crate) fn focused(&self) -> Option<TargetId> {
        self.focused
    }

    pub(crate) fn remaining(&self) -> u64 {
        self.allowed.saturating_sub(self.consumed)
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.consumed >= self.allowed
    }
}

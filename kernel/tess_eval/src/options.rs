//! Evaluation policy knobs.

use std::time::Duration;

/// What `VariableAssign` does when the target variable is not declared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UndeclaredAssignment {
    /// Reduce to `UNKNOWN` without assigning anything.
    #[default]
    Unknown,
    /// Fail with `UndeclaredVariable`.
    Reject,
}

/// Options read by reduction and resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Compare reference, variable and method names case-insensitively.
    pub ignore_case: bool,
    /// Maximum reduction nesting depth. `None` lets the stack grow on demand.
    pub max_depth: Option<usize>,
    /// Wall-clock budget, turned into a deadline when the environment is built.
    pub timeout: Option<Duration>,
    pub undeclared_assignment: UndeclaredAssignment,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            max_depth: None,
            timeout: None,
            undeclared_assignment: UndeclaredAssignment::Unknown,
        }
    }
}

impl EvalOptions {
    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_undeclared_assignment(mut self, policy: UndeclaredAssignment) -> Self {
        self.undeclared_assignment = policy;
        self
    }
}

//! Accumulated policy violations.

use serde::Serialize;
use std::fmt;

/// One rejected integration, skill, skill source, or model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyViolation {
    pub instance: String,
    pub agent: String,
    pub message: String,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.instance, self.agent, self.message)
    }
}

/// Every violation across all evaluated agents, in evaluation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyReport {
    violations: Vec<PolicyViolation>,
}

impl PolicyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: PolicyViolation) {
        self.violations.push(violation);
    }

    pub fn extend(&mut self, other: PolicyReport) {
        self.violations.extend(other.violations);
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

#[cfg(test)]
impl PolicyReport {
    /// Rendered messages, `instance/agent: ...`.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }
}

impl fmt::Display for PolicyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Policy validation failed:")?;
        for violation in &self.violations {
            write!(f, "\n- {}", violation)?;
        }
        Ok(())
    }
}

//! Accumulated inventory validation issues.

use serde::Serialize;
use std::fmt;

/// Category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Missing field, wrong type, unsupported version.
    Structural,
    /// Duplicate identifier, overlapping port range, shared path role.
    Collision,
    /// Referenced file does not exist.
    Reference,
}

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

/// Every issue found in one validation pass, in discovery order.
///
/// Validation never stops at the first problem; callers thread one report
/// through each check and inspect it at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structural(&mut self, message: impl Into<String>) {
        self.push(IssueKind::Structural, message);
    }

    pub fn collision(&mut self, message: impl Into<String>) {
        self.push(IssueKind::Collision, message);
    }

    pub fn reference(&mut self, message: impl Into<String>) {
        self.push(IssueKind::Reference, message);
    }

    fn push(&mut self, kind: IssueKind, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            kind,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }
}

#[cfg(test)]
impl ValidationReport {
    /// True when any issue message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.issues.iter().any(|i| i.message.contains(needle))
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inventory validation failed:")?;
        for issue in &self.issues {
            write!(f, "\n- {}", issue.message)?;
        }
        Ok(())
    }
}

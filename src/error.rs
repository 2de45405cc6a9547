//! Error types for fleetconf.
//!
//! Uses thiserror for derive macros. Batch operations (inventory validation,
//! policy evaluation) surface a single report carrying every issue found;
//! parsing and rendering fail fast on the first fault.

use crate::exit_codes;
use crate::inventory::ValidationReport;
use crate::policy::PolicyReport;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for fleetconf operations.
#[derive(Error, Debug)]
pub enum FleetError {
    /// Invalid arguments or a reference to an unknown instance/agent.
    #[error("{0}")]
    UserError(String),

    /// A document or layer has the wrong shape (missing field, wrong type).
    #[error("{0}")]
    Structural(String),

    /// Duplicate identifier or another uniqueness conflict raised by a mutation.
    #[error("{0}")]
    Collision(String),

    /// A referenced file does not exist.
    #[error("{kind} not found: {}", path.display())]
    Reference { kind: &'static str, path: PathBuf },

    /// A layer includes itself, directly or transitively.
    #[error("cyclic $include detected at: {} (chain: {})", path.display(), format_chain(chain))]
    IncludeCycle { path: PathBuf, chain: Vec<PathBuf> },

    /// Layer text could not be reduced to structured data.
    #[error("failed to parse config layer {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A `${NAME}` placeholder without fallback refers to an unset variable.
    #[error("missing required environment variable: {name}")]
    MissingVariable { name: String },

    /// Inventory validation found one or more issues.
    #[error("{0}")]
    Validation(ValidationReport),

    /// Policy evaluation found one or more violations.
    #[error("{0}")]
    Policy(PolicyReport),

    /// Filesystem operation failed.
    #[error("{action} '{}': {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FleetError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            FleetError::UserError(_) | FleetError::Collision(_) => exit_codes::USER_ERROR,
            FleetError::Structural(_) | FleetError::Validation(_) => exit_codes::VALIDATION_FAILURE,
            FleetError::Policy(_) => exit_codes::POLICY_VIOLATION,
            FleetError::Reference { .. }
            | FleetError::IncludeCycle { .. }
            | FleetError::Parse { .. }
            | FleetError::MissingVariable { .. } => exit_codes::RENDER_FAILURE,
            FleetError::Io { .. } => exit_codes::IO_FAILURE,
        }
    }

    /// Wrap an I/O error with the action and path it concerns.
    pub fn io(action: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        FleetError::Io {
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type alias for fleetconf operations.
pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_has_correct_exit_code() {
        let err = FleetError::UserError("instance not found: core".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn test_render_failures_share_exit_code() {
        let errs = [
            FleetError::MissingVariable {
                name: "PORT".to_string(),
            },
            FleetError::Parse {
                path: PathBuf::from("/tmp/a.json5"),
                message: "expected value".to_string(),
            },
            FleetError::Reference {
                kind: "config layer",
                path: PathBuf::from("/tmp/missing.json5"),
            },
        ];
        for err in errs {
            assert_eq!(err.exit_code(), exit_codes::RENDER_FAILURE);
        }
    }

    #[test]
    fn test_cycle_message_names_path_and_chain() {
        let err = FleetError::IncludeCycle {
            path: PathBuf::from("/cfg/a.json5"),
            chain: vec![PathBuf::from("/cfg/a.json5"), PathBuf::from("/cfg/b.json5")],
        };
        assert_eq!(
            err.to_string(),
            "cyclic $include detected at: /cfg/a.json5 (chain: /cfg/a.json5 -> /cfg/b.json5)"
        );
        assert_eq!(err.exit_code(), exit_codes::RENDER_FAILURE);
    }

    #[test]
    fn test_missing_variable_message_names_variable() {
        let err = FleetError::MissingVariable {
            name: "PORT".to_string(),
        };
        assert_eq!(err.to_string(), "missing required environment variable: PORT");
    }
}

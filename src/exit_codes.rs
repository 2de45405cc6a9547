//! Exit code constants for the fleetconf CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unknown instance or agent)
//! - 2: Inventory validation failure (structure, collisions, missing layers)
//! - 3: Policy violation
//! - 4: Render failure (parse error, include cycle, missing include, missing variable)
//! - 5: I/O failure while reading or writing artifacts

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or a reference to an unknown instance/agent.
pub const USER_ERROR: i32 = 1;

/// Inventory validation failure: one or more structural, collision, or reference issues.
pub const VALIDATION_FAILURE: i32 = 2;

/// Policy evaluation produced at least one violation.
pub const POLICY_VIOLATION: i32 = 3;

/// Configuration rendering aborted.
pub const RENDER_FAILURE: i32 = 4;

/// Filesystem read or write failed.
pub const IO_FAILURE: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            VALIDATION_FAILURE,
            POLICY_VIOLATION,
            RENDER_FAILURE,
            IO_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn test_success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}

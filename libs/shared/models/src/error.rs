use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error taxonomy shared by every cell.
///
/// All lifecycle, availability and booking violations are raised synchronously
/// to the immediate caller; nothing is swallowed or retried below this
/// boundary. A transport layer embedding these crates maps `InvalidArgument`,
/// `InvalidState` and `Conflict` to a client error class and `NotFound` to a
/// not-found response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ClinicError {
    /// Malformed input to a constructor or mutator: non-chronological
    /// start/end, past-dated scheduling, empty required text, negative
    /// amounts.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation requested from a state that forbids it.
    #[error("Operation '{operation}' is not allowed while {state}")]
    InvalidState { state: String, operation: String },

    /// A proposed booking overlaps an existing one, or a double-booking race
    /// was detected at commit time. Retrying is the caller's decision.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced entity does not exist. Raised by the storage collaborator
    /// and propagated unchanged.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ClinicError {
    /// Shorthand for refusing `operation` in the given state.
    pub fn invalid_state(state: impl ToString, operation: &str) -> Self {
        ClinicError::InvalidState {
            state: state.to_string(),
            operation: operation.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_names_state_and_operation() {
        let err = ClinicError::invalid_state("cancelled", "confirm");
        assert_eq!(
            err.to_string(),
            "Operation 'confirm' is not allowed while cancelled"
        );
    }
}

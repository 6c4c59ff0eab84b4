//! Error types for the NeuroLift domain

use thiserror::Error;

/// Domain-level error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid transition: cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: String,
    },
}

impl DomainError {
    /// Creates an invalid transition error for an action attempted in the wrong state.
    pub fn invalid_transition(action: &'static str, state: impl ToString) -> Self {
        Self::InvalidTransition {
            action,
            state: state.to_string(),
        }
    }
}

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = DomainError::invalid_transition("add a set", "setup");
        assert_eq!(
            err.to_string(),
            "Invalid transition: cannot add a set while setup"
        );
    }
}

//! Client error handling
//!
//! One error type for everything the client layer does: local storage,
//! the remote store, serialization and the domain rules underneath.

use neurolift_shared::DomainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Remote store unreachable")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ClientError::Validation(msg),
            DomainError::NotFound(what) => ClientError::NotFound(what),
            err @ DomainError::InvalidTransition { .. } => ClientError::InvalidState(err.to_string()),
        }
    }
}

impl ClientError {
    /// Short machine-readable code for logs and UI
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::InvalidState(_) => "INVALID_STATE",
            ClientError::Remote { .. } => "REMOTE_ERROR",
            ClientError::Http(_) => "REMOTE_UNREACHABLE",
            ClientError::Serialization(_) => "SERIALIZATION_ERROR",
            ClientError::Database(_) => "DATABASE_ERROR",
            ClientError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Errors that may clear up if the call is retried later
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http(_) => true,
            ClientError::Remote { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsersError {
    #[error("User not found: {id}")]
    NotFound { id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Request interrupted: {reason}")]
    Interrupted { reason: String },

    #[error("Internal error")]
    Internal,
}

impl UsersError {
    pub fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::Interrupted {
            reason: reason.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for UsersError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            UserNotFound { id } => Self::not_found(id),
            e @ (NilIdNotAllowed
            | NewUserWithId
            | InvalidUserInput { .. }
            | InvalidPagination { .. }
            | InvalidFilter { .. }) => Self::validation(e.to_string()),
            e @ (Cancelled | DeadlineExceeded) => Self::interrupted(e.to_string()),
            Database { .. } => Self::internal(),
        }
    }
}

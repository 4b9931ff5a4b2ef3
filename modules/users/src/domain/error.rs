use thiserror::Error;
use uuid::Uuid;

use crate::contract::context::Interrupted;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("nil UUID is not allowed")]
    NilIdNotAllowed,

    #[error("new user can't have a predefined ID")]
    NewUserWithId,

    #[error("input user data is invalid: {message}")]
    InvalidUserInput { message: String },

    #[error("invalid pagination: {message}")]
    InvalidPagination { message: String },

    #[error("invalid filter: {message}")]
    InvalidFilter { message: String },

    #[error("user not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("request was cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn invalid_user_input(message: impl Into<String>) -> Self {
        Self::InvalidUserInput {
            message: message.into(),
        }
    }

    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::InvalidPagination {
            message: message.into(),
        }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<Interrupted> for DomainError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => Self::Cancelled,
            Interrupted::DeadlineExceeded => Self::DeadlineExceeded,
        }
    }
}

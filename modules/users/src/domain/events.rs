use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::User;

/// Kind of a user event, as seen by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserEventType {
    Created,
    Updated,
    PasswordChanged,
    Deleted,
}

impl UserEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "USER_CREATED",
            Self::Updated => "USER_UPDATED",
            Self::PasswordChanged => "USER_PASSWORD_CHANGED",
            Self::Deleted => "USER_DELETED",
        }
    }
}

impl std::fmt::Display for UserEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-agnostic domain event.
///
/// Created/Updated carry the post-mutation snapshot; the other kinds only
/// carry the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDomainEvent {
    Created { user: User, at: DateTime<Utc> },
    Updated { user: User, at: DateTime<Utc> },
    PasswordChanged { id: Uuid, at: DateTime<Utc> },
    Deleted { id: Uuid, at: DateTime<Utc> },
}

impl UserDomainEvent {
    pub fn created(user: User) -> Self {
        Self::Created {
            user,
            at: Utc::now(),
        }
    }

    pub fn updated(user: User) -> Self {
        Self::Updated {
            user,
            at: Utc::now(),
        }
    }

    pub fn password_changed(id: Uuid) -> Self {
        Self::PasswordChanged { id, at: Utc::now() }
    }

    pub fn deleted(id: Uuid) -> Self {
        Self::Deleted { id, at: Utc::now() }
    }

    pub fn kind(&self) -> UserEventType {
        match self {
            Self::Created { .. } => UserEventType::Created,
            Self::Updated { .. } => UserEventType::Updated,
            Self::PasswordChanged { .. } => UserEventType::PasswordChanged,
            Self::Deleted { .. } => UserEventType::Deleted,
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Created { user, .. } | Self::Updated { user, .. } => user.id,
            Self::PasswordChanged { id, .. } | Self::Deleted { id, .. } => *id,
        }
    }

    pub fn user_changes(&self) -> Option<&User> {
        match self {
            Self::Created { user, .. } | Self::Updated { user, .. } => Some(user),
            Self::PasswordChanged { .. } | Self::Deleted { .. } => None,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Created { at, .. }
            | Self::Updated { at, .. }
            | Self::PasswordChanged { at, .. }
            | Self::Deleted { at, .. } => *at,
        }
    }
}

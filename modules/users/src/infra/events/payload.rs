use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::events::UserDomainEvent;

/// Transport-level user fields carried by CREATED/UPDATED events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire format of a published user event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEventPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_changes: Option<UserSnapshot>,
    pub time: DateTime<Utc>,
}

impl From<&User> for UserSnapshot {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            nickname: u.nickname.clone(),
            email: u.email.clone(),
            country: u.country.clone(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<&UserDomainEvent> for UserEventPayload {
    fn from(e: &UserDomainEvent) -> Self {
        Self {
            kind: e.kind().as_str().to_string(),
            user_id: e.user_id(),
            user_changes: e.user_changes().map(UserSnapshot::from),
            time: e.at(),
        }
    }
}

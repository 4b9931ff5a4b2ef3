use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::{NewUser, Pagination, User, UserFilter, UserPatch};

/// REST DTO for user representation. Never carries the password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// REST DTO for creating a new user.
///
/// Missing fields deserialize as empty so that the service reports them as
/// validation errors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreateUserReq {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub email: String,
    pub country: String,
    pub password: String,
}

/// REST DTO for updating a user (partial). Absent and empty fields are both
/// left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUserReq {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub password: Option<String>,
}

/// Query string of `GET /users`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub pagesize: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            nickname: user.nickname,
            email: user.email,
            country: user.country,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl CreateUserReq {
    /// Split the request into the profile and the plaintext password.
    pub fn into_parts(self) -> (NewUser, String) {
        let new_user = NewUser {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            nickname: self.nickname,
            email: self.email,
            country: self.country,
        };
        (new_user, self.password)
    }
}

impl UpdateUserReq {
    pub fn into_parts(self) -> (UserPatch, String) {
        let patch = UserPatch {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            nickname: self.nickname.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        };
        (patch, self.password.unwrap_or_default())
    }
}

impl ListUsersQuery {
    pub fn into_parts(self) -> (Pagination, UserFilter) {
        let pagination = Pagination::new(self.page.unwrap_or(0), self.pagesize.unwrap_or(0));
        let filter = UserFilter {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            nickname: self.nickname.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
        };
        (pagination, filter)
    }
}

use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    context::RequestCtx,
    error::UsersError,
    model::{NewUser, Pagination, User, UserFilter, UserPatch},
};

/// Public API trait for the users crate that other crates can use
#[async_trait]
pub trait UsersApi: Send + Sync {
    /// Create a new user; the password is hashed and never returned
    async fn create_user(
        &self,
        ctx: &RequestCtx,
        new_user: NewUser,
        password: &str,
    ) -> Result<User, UsersError>;

    /// Get a user by ID
    async fn get_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<User, UsersError>;

    /// Update profile fields and/or password.
    /// `None` when only the password changed.
    async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        patch: UserPatch,
        password: &str,
    ) -> Result<Option<User>, UsersError>;

    /// Delete a user by ID
    async fn delete_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), UsersError>;

    /// List users with page/page-size pagination and a field filter
    async fn list_users(
        &self,
        ctx: &RequestCtx,
        pagination: Pagination,
        filter: UserFilter,
    ) -> Result<Vec<User>, UsersError>;
}

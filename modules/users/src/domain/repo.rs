use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::{NewUser, User, UserFilter, UserPatch};
use crate::domain::password::PasswordHash;

/// Resolved page window handed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// "Not found" is reported through `Option`/`bool` so the service can turn it
/// into a single stable error kind regardless of the storage technology.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Load a user by id.
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    /// Filtered listing, newest first, ties broken by email ascending.
    async fn list(&self, window: PageWindow, filter: &UserFilter) -> anyhow::Result<Vec<User>>;
    /// Insert profile and password hash atomically.
    ///
    /// Storage assigns the id and both timestamps.
    async fn create(&self, user: &NewUser, password: &PasswordHash) -> anyhow::Result<User>;
    /// Apply non-empty patch fields; `None` when no row matched.
    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>>;
    /// Replace the stored password hash. Returns false if no row matched.
    async fn update_password(&self, id: Uuid, password: &PasswordHash) -> anyhow::Result<bool>;
    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

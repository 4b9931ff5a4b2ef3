use std::sync::Arc;

use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::contract::context::RequestCtx;
use crate::contract::model::{NewUser, Pagination, User, UserFilter, UserPatch, DEFAULT_PAGE_SIZE};
use crate::domain::error::DomainError;
use crate::domain::events::UserDomainEvent;
use crate::domain::password::PasswordHash;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{PageWindow, UsersRepository};

/// Domain service orchestrating user persistence and event emission.
/// Depends only on the repository and publisher ports, not on infra types.
///
/// Stateless: every call validates its input before touching a collaborator,
/// persists through the repository, then publishes on a best-effort basis.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    events: Arc<dyn EventPublisher<UserDomainEvent>>,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Limit used when a list request has `page_size == 0`.
    pub default_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn storage_error(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        events: Arc<dyn EventPublisher<UserDomainEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            repo,
            events,
            config,
        }
    }

    #[instrument(
        name = "users.service.create_user",
        skip(self, ctx, new_user, password),
        fields(email = %new_user.email, correlation_id = ctx.correlation_id().unwrap_or_default())
    )]
    pub async fn create_user(
        &self,
        ctx: &RequestCtx,
        mut new_user: NewUser,
        password: &str,
    ) -> Result<User, DomainError> {
        info!("Creating new user");

        if new_user.has_preset_id() {
            return Err(DomainError::NewUserWithId);
        }
        new_user
            .validate()
            .map_err(|e| DomainError::invalid_user_input(e.to_string()))?;

        new_user.normalize();
        let hash = PasswordHash::from_plain(password);

        let user = ctx
            .run(self.repo.create(&new_user, &hash))
            .await?
            .map_err(storage_error)?;

        self.publish(ctx, UserDomainEvent::created(user.clone()))
            .await;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(
        name = "users.service.get_user",
        skip(self, ctx),
        fields(user_id = %id, correlation_id = ctx.correlation_id().unwrap_or_default())
    )]
    pub async fn get_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");

        if id.is_nil() {
            return Err(DomainError::NilIdNotAllowed);
        }

        let user = ctx
            .run(self.repo.find_by_id(id))
            .await?
            .map_err(storage_error)?
            .ok_or_else(|| DomainError::user_not_found(id))?;

        debug!("Successfully retrieved user");
        Ok(user)
    }

    /// Apply a profile patch and/or a password change.
    ///
    /// The profile step runs first and, if it fails, the password step is not
    /// attempted. Returns the post-update user when the profile changed, and
    /// `None` when only the password (or nothing) was touched.
    #[instrument(
        name = "users.service.update_user",
        skip(self, ctx, patch, password),
        fields(user_id = %id, correlation_id = ctx.correlation_id().unwrap_or_default())
    )]
    pub async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        mut patch: UserPatch,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        info!("Updating user");

        if id.is_nil() {
            return Err(DomainError::NilIdNotAllowed);
        }
        patch
            .validate_if_not_empty()
            .map_err(|e| DomainError::invalid_user_input(e.to_string()))?;

        patch.normalize();

        let mut updated = None;
        if !patch.is_empty() {
            let user = ctx
                .run(self.repo.update(id, &patch))
                .await?
                .map_err(storage_error)?
                .ok_or_else(|| DomainError::user_not_found(id))?;

            self.publish(ctx, UserDomainEvent::updated(user.clone()))
                .await;
            updated = Some(user);
        }

        if password.is_empty() {
            info!(profile_changed = updated.is_some(), "Update finished");
            return Ok(updated);
        }

        let hash = PasswordHash::from_plain(password);
        let found = ctx
            .run(self.repo.update_password(id, &hash))
            .await?
            .map_err(storage_error)?;
        if !found {
            return Err(DomainError::user_not_found(id));
        }

        self.publish(ctx, UserDomainEvent::password_changed(id))
            .await;

        info!(profile_changed = updated.is_some(), "Successfully updated user and password");
        Ok(updated)
    }

    #[instrument(
        name = "users.service.delete_user",
        skip(self, ctx),
        fields(user_id = %id, correlation_id = ctx.correlation_id().unwrap_or_default())
    )]
    pub async fn delete_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        if id.is_nil() {
            return Err(DomainError::NilIdNotAllowed);
        }

        let deleted = ctx
            .run(self.repo.delete(id))
            .await?
            .map_err(storage_error)?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        self.publish(ctx, UserDomainEvent::deleted(id)).await;

        info!("Successfully deleted user");
        Ok(())
    }

    #[instrument(
        name = "users.service.list_users",
        skip(self, ctx, filter),
        fields(correlation_id = ctx.correlation_id().unwrap_or_default())
    )]
    pub async fn list_users(
        &self,
        ctx: &RequestCtx,
        pagination: Pagination,
        filter: &UserFilter,
    ) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");

        pagination
            .validate()
            .map_err(|e| DomainError::invalid_pagination(e.to_string()))?;
        filter
            .validate_if_not_empty()
            .map_err(|e| DomainError::invalid_filter(e.to_string()))?;

        let window = PageWindow {
            offset: pagination.offset(),
            limit: pagination.limit_or(self.config.default_page_size),
        };

        let users = ctx
            .run(self.repo.list(window, filter))
            .await?
            .map_err(storage_error)?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    /// Publish after the state change has been persisted. Failures (including
    /// an elapsed deadline) are logged and swallowed.
    async fn publish(&self, ctx: &RequestCtx, event: UserDomainEvent) {
        let kind = event.kind();
        let user_id = event.user_id();

        let outcome = match ctx.run(self.events.publish(ctx, &event)).await {
            Ok(res) => res,
            Err(interrupted) => Err(anyhow::Error::new(interrupted)),
        };

        match outcome {
            Ok(()) => debug!(event = %kind, user_id = %user_id, "Published user event"),
            Err(e) => error!(
                correlation_id = ctx.correlation_id().unwrap_or_default(),
                user_id = %user_id,
                event = %kind,
                error = %format!("{e:#}"),
                "failed to publish user event"
            ),
        }
    }
}

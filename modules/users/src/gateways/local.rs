use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::UsersApi,
    context::RequestCtx,
    error::UsersError,
    model::{NewUser, Pagination, User, UserFilter, UserPatch},
};
use crate::domain::service::Service;

/// Local implementation of the UsersApi trait that delegates to the domain service
pub struct UsersLocalClient {
    service: Arc<Service>,
}

impl UsersLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UsersApi for UsersLocalClient {
    async fn create_user(
        &self,
        ctx: &RequestCtx,
        new_user: NewUser,
        password: &str,
    ) -> Result<User, UsersError> {
        self.service
            .create_user(ctx, new_user, password)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<User, UsersError> {
        self.service.get_user(ctx, id).await.map_err(Into::into)
    }

    async fn update_user(
        &self,
        ctx: &RequestCtx,
        id: Uuid,
        patch: UserPatch,
        password: &str,
    ) -> Result<Option<User>, UsersError> {
        self.service
            .update_user(ctx, id, patch, password)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, ctx: &RequestCtx, id: Uuid) -> Result<(), UsersError> {
        self.service.delete_user(ctx, id).await.map_err(Into::into)
    }

    async fn list_users(
        &self,
        ctx: &RequestCtx,
        pagination: Pagination,
        filter: UserFilter,
    ) -> Result<Vec<User>, UsersError> {
        self.service
            .list_users(ctx, pagination, &filter)
            .await
            .map_err(Into::into)
    }
}

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Extension,
};
use tracing::{error, info};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::rest::dto::{CreateUserReq, ListUsersQuery, UpdateUserReq, UserDto};
use crate::api::rest::error::{from_parts, map_domain_error};
use crate::api::rest::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::rest::problem::ProblemResponse;
use crate::api::rest::routes::REQUEST_ID_HEADER;
use crate::api::rest::sse::user_events_response;
use crate::contract::context::RequestCtx;
use crate::domain::service::Service;
use crate::infra::events::BroadcastEventPublisher;

/// Everything the handlers need, shared through an `Extension`.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<Service>,
    /// Deadline given to every request's context.
    pub request_timeout: Duration,
    /// Present when events are broadcast in-process; enables the SSE route.
    pub events: Option<BroadcastEventPublisher>,
    /// Parent of every request's cancellation token.
    pub shutdown: CancellationToken,
}

impl ApiState {
    pub fn new(service: Arc<Service>, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
            events: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_events(mut self, events: BroadcastEventPublisher) -> Self {
        self.events = Some(events);
        self
    }

    /// Cancel in-flight requests when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Request context carrying the `x-request-id` as correlation id.
    fn request_ctx(&self, headers: &HeaderMap) -> RequestCtx {
        let ctx = RequestCtx::new()
            .with_timeout(self.request_timeout)
            .with_cancellation(self.shutdown.child_token());
        match headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some(id) => ctx.with_correlation_id(id),
            None => ctx,
        }
    }
}

/// List users page by page, optionally filtered
pub async fn list_users(
    Extension(state): Extension<ApiState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<Vec<UserDto>>, ProblemResponse> {
    let ctx = state.request_ctx(&headers);
    let (pagination, filter) = query.into_parts();

    match state.service.list_users(&ctx, pagination, &filter).await {
        Ok(users) => Ok(Json(users.into_iter().map(UserDto::from).collect())),
        Err(e) => {
            error!("Failed to list users: {}", e);
            Err(map_domain_error(&e, uri.path(), ctx.correlation_id()))
        }
    }
}

/// Get a specific user by ID
pub async fn get_user(
    Extension(state): Extension<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Json<UserDto>, ProblemResponse> {
    let ctx = state.request_ctx(&headers);

    match state.service.get_user(&ctx, id).await {
        Ok(user) => Ok(Json(UserDto::from(user))),
        Err(e) => {
            error!("Failed to get user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), ctx.correlation_id()))
        }
    }
}

/// Create a new user
pub async fn create_user(
    Extension(state): Extension<ApiState>,
    headers: HeaderMap,
    uri: Uri,
    ApiJson(req_body): ApiJson<CreateUserReq>,
) -> Result<(StatusCode, Json<UserDto>), ProblemResponse> {
    let ctx = state.request_ctx(&headers);
    let (new_user, password) = req_body.into_parts();
    info!(email = %new_user.email, "Creating user");

    match state.service.create_user(&ctx, new_user, &password).await {
        Ok(user) => Ok((StatusCode::CREATED, Json(UserDto::from(user)))),
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(map_domain_error(&e, uri.path(), ctx.correlation_id()))
        }
    }
}

/// Update profile fields and/or the password.
///
/// Responds 200 with the user when the profile changed, 204 otherwise.
pub async fn update_user(
    Extension(state): Extension<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
    headers: HeaderMap,
    uri: Uri,
    ApiJson(req_body): ApiJson<UpdateUserReq>,
) -> Result<Response, ProblemResponse> {
    let ctx = state.request_ctx(&headers);
    let (patch, password) = req_body.into_parts();

    match state.service.update_user(&ctx, id, patch, &password).await {
        Ok(Some(user)) => Ok(Json(UserDto::from(user)).into_response()),
        Ok(None) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => {
            error!("Failed to update user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), ctx.correlation_id()))
        }
    }
}

/// Delete a user by ID
pub async fn delete_user(
    Extension(state): Extension<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<StatusCode, ProblemResponse> {
    let ctx = state.request_ctx(&headers);

    match state.service.delete_user(&ctx, id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            error!("Failed to delete user {}: {}", id, e);
            Err(map_domain_error(&e, uri.path(), ctx.correlation_id()))
        }
    }
}

/// SSE endpoint returning a live stream of user events.
pub async fn users_events(
    Extension(state): Extension<ApiState>,
    uri: Uri,
) -> Result<Response, ProblemResponse> {
    match &state.events {
        Some(publisher) => {
            info!("New SSE connection for user events");
            Ok(user_events_response(publisher).into_response())
        }
        None => Err(from_parts(
            StatusCode::NOT_FOUND,
            "USERS_EVENTS_UNAVAILABLE",
            "Event stream unavailable",
            "User events are published to an external endpoint",
            uri.path(),
            None,
        )),
    }
}

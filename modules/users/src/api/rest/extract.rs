//! `Path`, `Query` and `Json` wrappers whose rejections are problem responses.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::{request::Parts, HeaderMap, StatusCode, Uri},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::rest::error::from_parts;
use crate::api::rest::problem::ProblemResponse;
use crate::api::rest::routes::REQUEST_ID_HEADER;

fn rejection(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: String,
    uri: &Uri,
    headers: &HeaderMap,
) -> ProblemResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok());
    from_parts(status, code, title, detail, uri.path(), request_id)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(e) => Err(rejection(
                StatusCode::BAD_REQUEST,
                "USERS_INVALID_PATH",
                "Invalid path parameter",
                e.body_text(),
                &parts.uri,
                &parts.headers,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(e) => Err(rejection(
                StatusCode::BAD_REQUEST,
                "USERS_INVALID_QUERY",
                "Invalid query string",
                e.body_text(),
                &parts.uri,
                &parts.headers,
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let uri = req.uri().clone();
        let headers = req.headers().clone();
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(e) => Err(rejection(
                e.status(),
                "USERS_INVALID_BODY",
                "Invalid request body",
                e.body_text(),
                &uri,
                &headers,
            )),
        }
    }
}

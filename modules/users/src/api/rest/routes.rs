use axum::{
    body::Body,
    http::{header, HeaderName, Method, Request},
    routing::get,
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::rest::handlers::{self, ApiState};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const API_PREFIX: &str = "/api/v1";

/// Any origin may call the API with the usual read and write methods.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Mount the users API under `/api/v1` on `router`.
///
/// Every request gets an `x-request-id` (generated when absent, echoed on the
/// response) and an `http_request` span carrying it. CORS applies to every route.
pub fn register_routes(router: Router, state: ApiState) -> Router {
    let users = Router::new()
        .route(
            &format!("{API_PREFIX}/users"),
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            &format!("{API_PREFIX}/users/events"),
            get(handlers::users_events),
        )
        .route(
            &format!("{API_PREFIX}/users/{{id}}"),
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .layer(Extension(state));

    router.merge(users).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(
                HeaderName::from_static(REQUEST_ID_HEADER),
                MakeRequestUuid,
            ))
            .layer(
                TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        uri = %req.uri().path(),
                        request_id = %rid,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID_HEADER,
            )))
            .layer(cors_layer()),
    )
}

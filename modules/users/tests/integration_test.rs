//! End-to-end tests for the users module.
//!
//! - Each test runs on a fresh in-memory SQLite DB and applies migrations.
//! - The service is wired with the SeaORM repository and the broadcast publisher.
//! - The local client and the REST router run against the same service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use users::api::rest::dto::UserDto;
use users::api::rest::{register_routes, ApiState};
use users::contract::client::UsersApi;
use users::contract::context::RequestCtx;
use users::contract::error::UsersError;
use users::contract::model::{NewUser, Pagination, UserFilter, UserPatch};
use users::domain::service::{Service, ServiceConfig};
use users::gateways::local::UsersLocalClient;
use users::infra::events::BroadcastEventPublisher;
use users::infra::storage::migrations::Migrator;
use users::infra::storage::SeaOrmUsersRepository;
use uuid::Uuid;

async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

struct App {
    service: Arc<Service>,
    events: BroadcastEventPublisher,
}

async fn create_app() -> App {
    let db = create_test_db().await;
    let events = BroadcastEventPublisher::new(32);
    let service = Arc::new(Service::new(
        Arc::new(SeaOrmUsersRepository::new(db)),
        Arc::new(events.clone()),
        ServiceConfig::default(),
    ));
    App { service, events }
}

fn jane() -> NewUser {
    NewUser {
        id: None,
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        nickname: "janedoe".into(),
        email: "janedoe@email.com".into(),
        country: "uk".into(),
    }
}

#[tokio::test]
async fn local_client_full_lifecycle() {
    let app = create_app().await;
    let mut rx = app.events.subscribe();
    let client: Arc<dyn UsersApi> = Arc::new(UsersLocalClient::new(app.service.clone()));
    let ctx = RequestCtx::new().with_correlation_id("it-1");

    let created = client.create_user(&ctx, jane(), "testpwd").await.unwrap();
    assert_eq!(created.country, "UK");
    assert_eq!(client.get_user(&ctx, created.id).await.unwrap(), created);

    let updated = client
        .update_user(
            &ctx,
            created.id,
            UserPatch {
                nickname: "jane".into(),
                ..Default::default()
            },
            "newpwd",
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.nickname, "jane");
    assert_eq!(updated.created_at, created.created_at);

    let listed = client
        .list_users(
            &ctx,
            Pagination::default(),
            UserFilter {
                nickname: "JA".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(listed, vec![updated]);

    client.delete_user(&ctx, created.id).await.unwrap();
    assert_eq!(
        client.get_user(&ctx, created.id).await.unwrap_err(),
        UsersError::not_found(created.id)
    );

    let mut kinds = Vec::new();
    while let Ok(payload) = rx.try_recv() {
        assert_eq!(payload.user_id, created.id);
        kinds.push(payload.kind);
    }
    assert_eq!(
        kinds,
        vec![
            "USER_CREATED",
            "USER_UPDATED",
            "USER_PASSWORD_CHANGED",
            "USER_DELETED"
        ]
    );
}

#[tokio::test]
async fn local_client_maps_validation_errors() {
    let app = create_app().await;
    let client = UsersLocalClient::new(app.service.clone());

    let err = client
        .create_user(
            &RequestCtx::new(),
            NewUser {
                id: Some(Uuid::new_v4()),
                ..jane()
            },
            "pwd",
        )
        .await
        .unwrap_err();

    assert!(matches!(err, UsersError::Validation { .. }), "{err:?}");
}

#[tokio::test]
async fn rest_round_trip_against_sqlite() {
    let app = create_app().await;
    let router = register_routes(
        Router::new(),
        ApiState::new(app.service.clone(), Duration::from_secs(5)),
    );

    let resp = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "first_name": "John",
                        "last_name": "Doe",
                        "nickname": "johndoe",
                        "email": "johndoe@email.com",
                        "country": "US",
                        "password": "testpwd"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: UserDto = serde_json::from_slice(&bytes).unwrap();

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users?email=JOHN&country=us")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let listed: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], created.id.to_string());
}

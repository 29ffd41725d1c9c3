//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use parkify_api::auth::jwt::{generate_access_token, JwtConfig};
use parkify_api::config::{BookingPolicy, ServerConfig};
use parkify_api::router::build_app_router;
use parkify_api::state::AppState;
use parkify_core::types::DbId;
use parkify_core::vehicle::PerVehicle;
use parkify_db::models::spot::{CreateSpot, ParkingSpot};
use parkify_db::models::user::{CreateUser, User};
use parkify_db::repositories::{SpotRepo, UserRepo};
use parkify_db::PoolSettings;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        pool: PoolSettings::default(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router, with the production middleware stack
/// and the default booking policy, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
        policy: Arc::new(BookingPolicy::default()),
    };
    build_app_router(state)
}

/// A bearer token for `user_id` signed with the test secret.
pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send an unauthenticated GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST with no body at all.
pub async fn post_empty_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_user(pool: &PgPool, name: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@parkify.test", name.to_lowercase().replace(' ', ".")),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

/// A spot with `car_slots` car slots at 60 per hour.
pub async fn create_car_spot(pool: &PgPool, owner_id: DbId, car_slots: i32) -> ParkingSpot {
    SpotRepo::create(
        pool,
        &CreateSpot {
            owner_id,
            name: "Harbour Garage".to_string(),
            price: None,
            pricing: PerVehicle {
                car: Some(60),
                ..Default::default()
            },
            slots: PerVehicle {
                car: Some(car_slots),
                ..Default::default()
            },
        },
    )
    .await
    .unwrap()
}

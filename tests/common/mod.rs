#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use matrix_pms::app::{self, AppState};
use matrix_pms::auth::password::hash_password_with_salt;
use matrix_pms::auth::TokenIssuer;
use matrix_pms::config::{AppConfig, Environment};
use matrix_pms::database::{DatabaseError, MemoryUserStore, NewUser, User, UserStatus, UserStore};

pub const SECRET: &str = "integration-test-secret";
pub const PHONE: &str = "254712345678";
pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryUserStore>,
    pub user: User,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Token for any subject, signed with the app's secret
    pub fn token_for(&self, subject: Uuid, ttl: Duration) -> String {
        TokenIssuer::new(SECRET, Duration::days(7)).issue(subject, ttl).unwrap().token
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::for_environment(Environment::Development, SECRET);
    config.api.enable_request_logging = false;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

/// Router over an in-memory store seeded with one active user
pub async fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryUserStore::new());
    let user = store
        .create(NewUser {
            name: "Jane Wambui".into(),
            phone: PHONE.into(),
            password: hash_password_with_salt(PASSWORD, b"integration-salt").unwrap(),
            user_level_id: None,
            landlord_id: None,
            apartment_id: None,
            created_by: None,
        })
        .await
        .unwrap();

    let router = app::router(AppState::new(config, store.clone()));
    TestApp { router, store, user }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// `name=value` part of a `Set-Cookie` header, ready to send back
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().trim().to_string()
}

/// Store whose every call fails as if Postgres were unreachable
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn find_by_phone(&self, _phone: &str) -> Result<Option<User>, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn create(&self, _user: NewUser) -> Result<User, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn update_password(&self, _id: Uuid, _hash: &str, _by: Option<Uuid>) -> Result<User, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn set_status(&self, _id: Uuid, _status: UserStatus, _by: Option<Uuid>) -> Result<User, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

pub fn unavailable_router() -> Router {
    app::router(AppState::new(test_config(), Arc::new(UnavailableStore)))
}

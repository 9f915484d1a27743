#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::ServiceExt;
use userhub::router::init_router;
use userhub::state::AppState;
use userhub::web::Shutdown;
use userhub_auth::Authenticator;
use userhub_auth::testutil::{test_authenticator, token_for};
use userhub_config::WebConfig;
use userhub_core::password::{MIN_COST, hash_password_with_cost};
use userhub_db::{MemoryUserRepository, UserRepository};
use userhub_models::{NewUser, User};
use uuid::Uuid;

pub const PASSWORD: &str = "correct-pw";

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryUserRepository>,
    pub auth: Arc<Authenticator>,
    pub shutdown: Shutdown,
}

pub fn setup_test_app() -> TestApp {
    setup_with(MemoryUserRepository::new(), WebConfig::default())
}

pub fn setup_with(repo: MemoryUserRepository, web_config: WebConfig) -> TestApp {
    let repo = Arc::new(repo);
    let auth = Arc::new(test_authenticator());
    let shutdown = Shutdown::new();

    let store = userhub::modules::users::UserStore::new(repo.clone()).with_hash_cost(MIN_COST);
    let state = AppState::with_store(store, auth.clone(), web_config, shutdown.clone());

    TestApp {
        router: init_router(state),
        repo,
        auth,
        shutdown,
    }
}

/// A request deadline short enough to trip on a slow repository.
pub fn short_deadline() -> WebConfig {
    WebConfig {
        request_timeout: Duration::from_millis(50),
        ..WebConfig::default()
    }
}

impl TestApp {
    pub async fn seed_user(&self, email: &str, roles: &[&str]) -> User {
        let new_user = NewUser {
            name: "Test User".into(),
            email: email.into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            password: PASSWORD.into(),
            password_confirm: PASSWORD.into(),
        };
        let hash = hash_password_with_cost(PASSWORD, MIN_COST).unwrap();
        let user = User::create(new_user, hash, Uuid::new_v4(), Utc::now());
        self.repo.create(&user).await.unwrap();
        user
    }

    pub fn bearer(&self, user: &User) -> String {
        let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
        format!("Bearer {}", token_for(&self.auth, &user.id.to_string(), &roles))
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, body)
    }
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method("GET").uri(uri), authorization)
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, authorization: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method("DELETE").uri(uri), authorization)
        .body(Body::empty())
        .unwrap()
}

pub fn json(method: &str, uri: &str, authorization: Option<&str>, body: serde_json::Value) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), authorization)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn basic(uri: &str, email: &str, password: &str) -> Request<Body> {
    let mut request = get(uri, None);
    request
        .headers_mut()
        .typed_insert(Authorization::basic(email, password));
    request
}

fn with_auth(
    builder: axum::http::request::Builder,
    authorization: Option<&str>,
) -> axum::http::request::Builder {
    match authorization {
        Some(value) => builder.header(header::AUTHORIZATION, value),
        None => builder,
    }
}

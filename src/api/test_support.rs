//! Router harness for handler tests

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::api::router::create_router_with_state;
use crate::config::AppConfig;
use crate::domain::user::{NewUser, UserRole};
use crate::domain::NotificationSink;
use crate::infrastructure::notification::LogNotifier;
use crate::infrastructure::storage::InMemoryDatabase;
use crate::infrastructure::user::{Argon2Hasher, PasswordHasher};

const PASSWORD: &str = "secure_password123";

pub(crate) struct TestApp {
    router: Router,
    pub(crate) db: InMemoryDatabase,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier::new("http://localhost:8080")))
    }

    pub(crate) fn with_notifier(notifier: Arc<dyn NotificationSink>) -> Self {
        Self::build(test_config(), notifier)
    }

    pub(crate) fn build(config: AppConfig, notifier: Arc<dyn NotificationSink>) -> Self {
        let db = InMemoryDatabase::new();
        let state = crate::create_in_memory_state(&config, db.clone(), notifier).unwrap();

        Self {
            router: create_router_with_state(state),
            db,
        }
    }

    pub(crate) async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(body) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    pub(crate) async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub(crate) async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub(crate) async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub(crate) async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Register a user and log in; returns the id and a token
    ///
    /// Users with a role other than the default are written straight to the
    /// store, since self-registration only grants `member`.
    pub(crate) async fn register(&self, email: &str, role: Option<&str>) -> (i64, String) {
        match role {
            None => {
                let (status, body) = self
                    .post(
                        "/api/v1/auth/register",
                        None,
                        json!({"name": "Test", "email": email, "password": PASSWORD}),
                    )
                    .await;
                assert_eq!(status, StatusCode::CREATED, "{}", body);
            }
            Some(role) => {
                self.db
                    .lock()
                    .await
                    .insert_user(NewUser {
                        email: email.to_string(),
                        name: "Test".to_string(),
                        role: role.parse::<UserRole>().unwrap(),
                        password_hash: Argon2Hasher::new().hash(PASSWORD).unwrap(),
                    })
                    .unwrap();
            }
        }

        self.login(email).await
    }

    /// Log in with the shared test password
    pub(crate) async fn login(&self, email: &str) -> (i64, String) {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                json!({"email": email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    /// Create a company and a team in it; returns the team id
    pub(crate) async fn create_team(&self, token: &str) -> i64 {
        let (_, company) = self
            .post("/api/v1/companies", Some(token), json!({"name": "Acme"}))
            .await;

        let (status, team) = self
            .post(
                "/api/v1/teams",
                Some(token),
                json!({"name": "Platform", "company_id": company["id"]}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", team);

        team["id"].as_i64().unwrap()
    }
}

pub(crate) fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some("test-secret-key-12345".to_string());
    config
}

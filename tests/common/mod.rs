//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum_test::TestServer;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use poetry_server::config::Settings;
use poetry_server::infrastructure::memory::InMemoryUnitOfWork;
use poetry_server::presentation::middleware::Claims;
use poetry_server::startup::{build_router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test application backed by the in-memory store
pub struct TestApp {
    pub server: TestServer,
}

/// A caller with a signed token
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub token: String,
}

impl TestApp {
    /// Create a new test application with a fresh store
    pub async fn new() -> Self {
        let settings = Settings::builder("test")
            .and_then(|b| b.set_override("database.backend", "memory"))
            .and_then(|b| b.set_override("jwt.secret", TEST_SECRET))
            .and_then(|b| b.set_override("pagination.default_page_size", 5))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize::<Settings>())
            .and_then(Settings::validate)
            .expect("test settings");

        let state = AppState::new(InMemoryUnitOfWork::new(), settings);
        let server = TestServer::new(build_router(state)).expect("test server");

        Self { server }
    }

    /// A new user with a valid bearer token
    pub fn user(&self, name: &str) -> TestUser {
        let id = Uuid::new_v4();
        TestUser {
            id,
            name: name.to_string(),
            token: token_for(id, name, TEST_SECRET),
        }
    }

    /// Create a poem through the API and return its id
    pub async fn create_poem(&self, author: &TestUser, title: &str, published: bool) -> String {
        let response = self
            .server
            .post("/api/mypoems")
            .authorization_bearer(&author.token)
            .json(&json!({
                "title": title,
                "content": format!("{title}\nsecond line"),
                "tags": ["nature"],
                "categories": ["Haiku"],
                "isPublished": published,
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"]
            .as_str()
            .expect("poem id")
            .to_string()
    }

    /// Create a collection through the API and return its id
    pub async fn create_collection(&self, owner: &TestUser, name: &str, public: bool) -> String {
        let response = self
            .server
            .post("/api/collections")
            .authorization_bearer(&owner.token)
            .json(&json!({ "name": name, "isPublic": public }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["id"]
            .as_str()
            .expect("collection id")
            .to_string()
    }
}

/// Sign an HS256 token the way the identity provider does
pub fn token_for(user_id: Uuid, name: &str, secret: &str) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        name: Some(name.to_string()),
        preferred_username: None,
        exp: (Utc::now() + Duration::hours(1)).timestamp(),
        iss: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("sign token")
}

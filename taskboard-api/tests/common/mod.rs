/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and migrations
/// - Test user creation with issued tokens
/// - API request helpers
///
/// The tests need a running PostgreSQL instance reachable through
/// `DATABASE_URL` and are ignored by default. Run them with
/// `cargo test -- --ignored`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::models::auth_token::AuthToken;
use taskboard_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

/// A registered user together with their API token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        taskboard_shared::db::migrations::ensure_database_exists(&config.database.url).await?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migrations path is relative to this crate's Cargo.toml
        sqlx::migrate!("../taskboard-shared/migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext { db, app })
    }

    /// Creates a user directly in the database and issues a token
    pub async fn create_user(&self, fullname: &str) -> anyhow::Result<TestUser> {
        let password_hash = taskboard_shared::auth::password::hash_password("test password")?;

        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                fullname: fullname.to_string(),
                password_hash,
            },
        )
        .await?;

        let (_, token) = AuthToken::issue(&self.db, user.id).await?;

        Ok(TestUser { user, token })
    }

    /// Sends a request through the router and returns status and JSON body
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Token {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    /// Deletes a test user (cascades to their boards, tasks and comments)
    pub async fn cleanup_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

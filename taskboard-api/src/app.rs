/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::middleware;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                # Health check (public)
/// └── /api/
///     ├── POST /registration/                # Create account (public)
///     ├── POST /login/                       # Login (public)
///     ├── GET  /email-check/                 # Look up a user by email
///     ├── /boards/                           # Board CRUD
///     ├── /tasks/                            # Task CRUD + personal lists
///     └── /tasks/:task_id/comments/          # Comments on a task
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Token authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let public_api = Router::new()
        .route("/registration/", post(routes::auth::register))
        .route("/login/", post(routes::auth::login))
        .route("/email-check/", get(routes::auth::email_check));

    // Everything else requires a valid token
    let protected_api = Router::new()
        .route(
            "/boards/",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:board_id/",
            get(routes::boards::get_board)
                .patch(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route("/tasks/", post(routes::tasks::create_task))
        .route(
            "/tasks/assigned-to-me/",
            get(routes::tasks::assigned_to_me),
        )
        .route("/tasks/reviewing/", get(routes::tasks::reviewing))
        .route(
            "/tasks/:task_id/",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/tasks/:task_id/comments/",
            get(routes::comments::list_comments).post(routes::comments::create_comment),
        )
        .route(
            "/tasks/:task_id/comments/:comment_id/",
            delete(routes::comments::delete_comment),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let api_routes = public_api.merge(protected_api);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Extracts the opaque token from the Authorization header, validates it
/// against the database, then injects AuthContext into request extensions.
async fn token_auth_layer(
    state: axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let response = middleware::token_auth_middleware(state.db.clone(), req, next).await?;
    Ok(response)
}

/// Authentication middleware for Axum
///
/// Extracts the opaque token from the `Authorization` header, validates
/// it against the `auth_tokens` table, and adds an [`AuthContext`] to the
/// request extensions for handlers to consume.
///
/// Both `Authorization: Token <token>` (legacy clients send `Token`)
/// and `Authorization: Bearer <token>` are accepted.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use sqlx::PgPool;
/// use taskboard_shared::auth::middleware::{create_token_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// fn protected(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(handler))
///         .layer(middleware::from_fn(create_token_middleware(pool)))
/// }
/// ```
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::token::validate_token_format;
use crate::models::auth_token::AuthToken;

/// Authenticated subject, added to request extensions after a
/// successful token lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context for a validated token's user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token unknown, malformed, or revoked
    InvalidToken(String),

    /// Database error during token lookup
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the token value from an `Authorization` header
///
/// Accepts `Token <value>` and `Bearer <value>`.
pub fn parse_authorization_header(value: &str) -> Result<&str, AuthError> {
    value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::InvalidFormat("Expected Token or Bearer scheme".to_string()))
}

/// Token authentication middleware
///
/// Validates the presented token and injects [`AuthContext`] on success.
/// The token is hashed before lookup; the stored row's `last_used_at` is
/// bumped as a side effect.
///
/// # Errors
///
/// - 401 if the header is missing or malformed, or the token is unknown
pub async fn token_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = parse_authorization_header(auth_header)?;

    // Cheap format check before touching the database
    if !validate_token_format(token) {
        return Err(AuthError::InvalidToken("Invalid token".to_string()));
    }

    let auth_token = AuthToken::authenticate(&pool, token)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or_else(|| AuthError::InvalidToken("Invalid token".to_string()))?;

    req.extensions_mut()
        .insert(AuthContext::new(auth_token.user_id));

    Ok(next.run(req).await)
}

/// Creates a token authentication middleware closure
///
/// Helper that captures the database pool and returns a middleware
/// function suitable for `axum::middleware::from_fn`.
pub fn create_token_middleware(
    pool: PgPool,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    move |req, next| {
        let pool = pool.clone();
        Box::pin(token_auth_middleware(pool, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization_header() {
        assert_eq!(
            parse_authorization_header("Token tb_abc").unwrap(),
            "tb_abc"
        );
        assert_eq!(
            parse_authorization_header("Bearer tb_abc").unwrap(),
            "tb_abc"
        );
        assert!(parse_authorization_header("Basic dXNlcjpwYXNz").is_err());
        assert!(parse_authorization_header("tb_abc").is_err());
    }

    #[test]
    fn test_auth_context_new() {
        let user_id = Uuid::new_v4();
        let context = AuthContext::new(user_id);
        assert_eq!(context.user_id, user_id);
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::DatabaseError("test".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
/// - Email lookup
///
/// # Endpoints
///
/// - `POST /api/registration/` - Register new user
/// - `POST /api/login/` - Login and get a token
/// - `GET /api/email-check/` - Look up a user by email
///
/// Registration and login both answer with the same shape: the opaque
/// API token plus the user's identity fields. Login replaces any
/// previously issued token for the user.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::UserSummary,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::password,
    models::{
        auth_token::AuthToken,
        user::{CreateUser, User},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Full display name
    #[validate(length(min = 1, max = 255, message = "Fullname must not be empty"))]
    pub fullname: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation, must match `password`
    pub repeated_password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response for registration and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Opaque API token
    pub token: String,

    /// Full display name
    pub fullname: String,

    /// Email address
    pub email: String,

    /// User ID
    pub user_id: Uuid,
}

/// Email lookup query parameters
#[derive(Debug, Deserialize)]
pub struct EmailCheckQuery {
    /// Email address to look up
    pub email: String,
}

/// Register a new user
///
/// Creates a new user account and issues an API token.
///
/// # Endpoint
///
/// ```text
/// POST /api/registration/
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "fullname": "Jane Doe",
///   "password": "correct horse battery",
///   "repeated_password": "correct horse battery"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, passwords do not match, or
///   the email is already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    if req.password != req.repeated_password {
        return Err(ApiError::field_error(
            "repeated_password",
            "Passwords do not match",
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    // The unique constraint on email turns duplicates into a
    // validation error via the sqlx error mapping.
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            fullname: req.fullname,
            password_hash,
        },
    )
    .await?;

    let (_, token) = AuthToken::issue(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            fullname: user.fullname,
            email: user.email,
            user_id: user.id,
        }),
    ))
}

/// Login with email and password
///
/// Verifies credentials and issues a fresh API token, replacing any
/// token issued earlier.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    // Same error for unknown email and wrong password, so a caller
    // cannot probe which addresses are registered.
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::field_error("credentials", "Invalid email or password"))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::field_error(
            "credentials",
            "Invalid email or password",
        ));
    }

    let (_, token) = AuthToken::issue(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        fullname: user.fullname,
        email: user.email,
        user_id: user.id,
    }))
}

/// Look up a user by email
///
/// Used by the board member picker to resolve an email address to a
/// user before adding them to a board.
///
/// # Endpoint
///
/// ```text
/// GET /api/email-check/?email=user@example.com
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No account with that email
pub async fn email_check(
    State(state): State<AppState>,
    Query(query): Query<EmailCheckQuery>,
) -> ApiResult<Json<UserSummary>> {
    let user = User::find_by_email(&state.db, &query.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            fullname: "Jane Doe".to_string(),
            password: "long enough password".to_string(),
            repeated_password: "long enough password".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            fullname: "".to_string(),
            password: "long enough password".to_string(),
            repeated_password: "long enough password".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            fullname: "Jane Doe".to_string(),
            password: "short".to_string(),
            repeated_password: "short".to_string(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            fullname: "Jane Doe".to_string(),
            password: "long enough password".to_string(),
            repeated_password: "long enough password".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_validation() {
        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };
        assert!(req.validate().is_err());

        let req = LoginRequest {
            email: "user@example.com".to_string(),
            password: "whatever".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}

/// Stored authentication token model
///
/// Each user holds at most one active opaque token, issued at
/// registration and rotated at login. Only the SHA-256 digest of the
/// token is stored; validation hashes the presented token and looks the
/// digest up, so a database leak does not expose usable credentials.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token;

/// Stored token row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    /// Token row ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex digest of the plaintext token
    pub token_hash: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,

    /// When the token last authenticated a request
    pub last_used_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    /// Issues a token for a user, replacing any existing one
    ///
    /// Returns the stored row together with the plaintext token. This is
    /// the only place the plaintext exists; it cannot be recovered later.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the database
    /// connection fails.
    pub async fn issue(pool: &PgPool, user_id: Uuid) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, hash) = token::generate_token();

        let row = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, token_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET token_hash = EXCLUDED.token_hash,
                          created_at = NOW(),
                          last_used_at = NULL
            RETURNING id, user_id, token_hash, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(hash)
        .fetch_one(pool)
        .await?;

        Ok((row, plaintext))
    }

    /// Authenticates a plaintext token
    ///
    /// Hashes the token, looks up the row, and bumps `last_used_at` in
    /// the same statement. Returns `None` for an unknown token.
    pub async fn authenticate(
        pool: &PgPool,
        plaintext: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let hash = token::hash_token(plaintext);

        let row = sqlx::query_as::<_, AuthToken>(
            r#"
            UPDATE auth_tokens
            SET last_used_at = NOW()
            WHERE token_hash = $1
            RETURNING id, user_id, token_hash, created_at, last_used_at
            "#,
        )
        .bind(hash)
        .fetch_optional(pool)
        .await?;

        Ok(row)
    }
}

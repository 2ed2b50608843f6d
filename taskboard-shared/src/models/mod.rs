/// Database models for TaskBoard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts
/// - `auth_token`: Opaque API tokens (one per user)
/// - `board`: Boards and their membership
/// - `task`: Tasks on boards
/// - `comment`: Comments on tasks
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     fullname: "Jane Doe".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod auth_token;
pub mod board;
pub mod comment;
pub mod task;
pub mod user;

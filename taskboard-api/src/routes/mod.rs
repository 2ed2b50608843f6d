/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and email lookup
/// - `boards`: Board CRUD and membership
/// - `tasks`: Task CRUD and personal task lists
/// - `comments`: Comments on tasks

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod tasks;

use serde::{Deserialize, Serialize};
use taskboard_shared::models::user::User;
use uuid::Uuid;

/// Compact user representation embedded in board and task responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Full display name
    pub fullname: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            fullname: user.fullname,
        }
    }
}

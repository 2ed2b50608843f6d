/// Comment model and database operations
///
/// Comments hang off tasks and are immutable once written: they can be
/// created, listed and deleted, never edited. Deleting a task cascades
/// to its comments; deleting a user cascades to their comments.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    /// Unique comment ID
    pub id: Uuid,

    /// Task the comment belongs to
    pub task_id: Uuid,

    /// Authoring user
    pub author_id: Uuid,

    /// Comment body
    pub content: String,

    /// When the comment was written
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

impl Comment {
    /// Creates a new comment on a task
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (task_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, author_id, content, created_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.author_id)
        .bind(&data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists a task's comments, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, task_id, author_id, content, created_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Deletes a comment
    ///
    /// Returns true if the comment existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts the comments on a task
    pub async fn count_by_task(pool: &PgPool, task_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE task_id = $1")
                .bind(task_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

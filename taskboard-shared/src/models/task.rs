/// Task model and database operations
///
/// Tasks belong to exactly one board and move through a fixed set of
/// status columns. Assignee and reviewer are optional references to
/// users and are nulled out (not cascaded) when the user is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('to-do', 'in-progress', 'await-feedback', 'done');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'to-do',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE NOT NULL,
///     assignee_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     reviewer_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    AwaitFeedback,
    Done,
}

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Task row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Board the task belongs to
    pub board_id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Current workflow column
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Due date (date only, no time component)
    pub due_date: NaiveDate,

    /// User assigned to do the work
    pub assignee_id: Option<Uuid>,

    /// User assigned to review the work
    pub reviewer_id: Option<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub board_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: NaiveDate,
    pub assignee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
}

/// Input for updating a task
///
/// Outer `None` leaves the column untouched. For assignee and reviewer
/// the inner option distinguishes "set to this user" from "clear".
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub assignee_id: Option<Option<Uuid>>,
    pub reviewer_id: Option<Option<Uuid>>,
}

const TASK_COLUMNS: &str = "id, board_id, title, description, status, priority, due_date, \
     assignee_id, reviewer_id, created_at, updated_at";

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO tasks (board_id, title, description, status, priority, due_date, assignee_id, reviewer_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.board_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.status)
            .bind(data.priority)
            .bind(data.due_date)
            .bind(data.assignee_id)
            .bind(data.reviewer_id)
            .fetch_one(pool)
            .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    /// Applies a partial update to a task
    ///
    /// Builds the SET clause dynamically from the provided fields.
    /// Returns `None` when the task does not exist; a no-op update
    /// returns the current row.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut sets = Vec::new();
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }
        if data.priority.is_some() {
            bind_count += 1;
            sets.push(format!("priority = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            sets.push(format!("due_date = ${}", bind_count));
        }
        if data.assignee_id.is_some() {
            bind_count += 1;
            sets.push(format!("assignee_id = ${}", bind_count));
        }
        if data.reviewer_id.is_some() {
            bind_count += 1;
            sets.push(format!("reviewer_id = ${}", bind_count));
        }

        if sets.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let query = format!(
            "UPDATE tasks SET {}, updated_at = NOW() WHERE id = $1 RETURNING {}",
            sets.join(", "),
            TASK_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(priority) = data.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }
        if let Some(assignee_id) = data.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(reviewer_id) = data.reviewer_id {
            q = q.bind(reviewer_id);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Returns true if the task existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks assigned to a user, newest first
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE assignee_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists tasks a user is reviewing, newest first
    pub async fn list_by_reviewer(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE reviewer_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Lists the tasks on a board, oldest first
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE board_id = $1 ORDER BY created_at",
            TASK_COLUMNS
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(board_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::ToDo).unwrap(),
            "\"to-do\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::AwaitFeedback).unwrap(),
            "\"await-feedback\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Done).unwrap(),
            "\"done\""
        );
    }

    #[test]
    fn test_status_deserialization() {
        let status: TaskStatus = serde_json::from_str("\"await-feedback\"").unwrap();
        assert_eq!(status, TaskStatus::AwaitFeedback);

        let invalid: Result<TaskStatus, _> = serde_json::from_str("\"review\"");
        assert!(invalid.is_err());
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskPriority::Low).unwrap(),
            "\"low\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::Medium).unwrap(),
            "\"medium\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPriority::High).unwrap(),
            "\"high\""
        );
    }

    #[test]
    fn test_priority_deserialization_rejects_unknown() {
        let invalid: Result<TaskPriority, _> = serde_json::from_str("\"urgent\"");
        assert!(invalid.is_err());
    }
}

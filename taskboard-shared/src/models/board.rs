/// Board model and database operations
///
/// A board is a Kanban workspace with one owner and a set of members.
/// Membership lives in the `board_members` join table and drives the
/// entire authorization model: the owner row is inserted at creation
/// time and preserved on every member update, so the "owner is always a
/// member" invariant holds at the data layer as well as in the policy.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE board_members (
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (board_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::board::{Board, CreateBoard};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, member: Uuid) -> Result<(), sqlx::Error> {
/// let board = Board::create(&pool, CreateBoard {
///     title: "Sprint 12".to_string(),
///     owner_id: owner,
///     member_ids: vec![member],
/// }).await?;
///
/// let access = Board::access(&pool, board.id).await?.expect("board exists");
/// assert!(access.is_member(owner));
/// assert!(access.is_member(member));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::policy::BoardAccess;

/// Board row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBoard {
    /// Board title
    pub title: String,

    /// Owner (also inserted as a member)
    pub owner_id: Uuid,

    /// Additional member user ids (may include the owner, duplicates ignored)
    pub member_ids: Vec<Uuid>,
}

/// Input for updating a board
///
/// Only non-None fields are applied. A member update replaces the whole
/// member set; the owner is kept regardless of the supplied list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBoard {
    /// New title
    pub title: Option<String>,

    /// Replacement member set
    pub member_ids: Option<Vec<Uuid>>,
}

/// Board summary with aggregate counts, used by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Number of members (owner included)
    pub member_count: i64,

    /// Total number of tasks on the board
    pub ticket_count: i64,

    /// Tasks still in the to-do column
    pub tasks_to_do_count: i64,

    /// Tasks with high priority
    pub tasks_high_prio_count: i64,
}

const SUMMARY_COLUMNS: &str = r#"
    b.id, b.title, b.owner_id,
    (SELECT COUNT(*) FROM board_members m WHERE m.board_id = b.id) AS member_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id) AS ticket_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.status = 'to-do') AS tasks_to_do_count,
    (SELECT COUNT(*) FROM tasks t WHERE t.board_id = b.id AND t.priority = 'high') AS tasks_high_prio_count
"#;

impl Board {
    /// Creates a board and its initial member set in one transaction
    ///
    /// The owner is always inserted into `board_members`; the supplied
    /// member list is added on top with duplicates ignored.
    pub async fn create(pool: &PgPool, data: CreateBoard) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(&data.title)
        .bind(data.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut members = data.member_ids;
        members.push(data.owner_id);

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id)
            SELECT $1, user_id FROM UNNEST($2::uuid[]) AS t(user_id)
            ON CONFLICT (board_id, user_id) DO NOTHING
            "#,
        )
        .bind(board.id)
        .bind(&members)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Updates a board's title and/or member set in one transaction
    ///
    /// Member replacement deletes every membership row except the
    /// owner's, then inserts the new set. Returns `None` when the board
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateBoard,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = match sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET title = COALESCE($2, title), updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .fetch_optional(&mut *tx)
        .await?
        {
            Some(board) => board,
            None => return Ok(None),
        };

        if let Some(mut member_ids) = data.member_ids {
            member_ids.push(board.owner_id);

            sqlx::query("DELETE FROM board_members WHERE board_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO board_members (board_id, user_id)
                SELECT $1, user_id FROM UNNEST($2::uuid[]) AS t(user_id)
                ON CONFLICT (board_id, user_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(&member_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Some(board))
    }

    /// Deletes a board
    ///
    /// Tasks and comments go with it via ON DELETE CASCADE. Returns true
    /// if the board existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the authorization snapshot for a board
    ///
    /// Returns `None` when the board does not exist.
    pub async fn access(pool: &PgPool, id: Uuid) -> Result<Option<BoardAccess>, sqlx::Error> {
        let board = match Self::find_by_id(pool, id).await? {
            Some(board) => board,
            None => return Ok(None),
        };

        let members = Self::member_ids(pool, id).await?;

        Ok(Some(BoardAccess::new(board.owner_id, members)))
    }

    /// Lists a board's member user ids
    pub async fn member_ids(pool: &PgPool, id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT user_id FROM board_members
            WHERE board_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Summary (with counts) for a single board
    pub async fn summary(pool: &PgPool, id: Uuid) -> Result<Option<BoardSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM boards b WHERE b.id = $1",
            SUMMARY_COLUMNS
        );

        let summary = sqlx::query_as::<_, BoardSummary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(summary)
    }

    /// Summaries of every board the user is a member of
    pub async fn summaries_for_member(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM boards b
            JOIN board_members bm ON bm.board_id = b.id
            WHERE bm.user_id = $1
            ORDER BY b.created_at
            "#,
            SUMMARY_COLUMNS
        );

        let summaries = sqlx::query_as::<_, BoardSummary>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_board_default() {
        let update = UpdateBoard::default();
        assert!(update.title.is_none());
        assert!(update.member_ids.is_none());
    }

    // Database operations are covered by the API integration tests.
}

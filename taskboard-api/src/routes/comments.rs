/// Comment endpoints
///
/// # Endpoints
///
/// - `GET /api/tasks/:task_id/comments/` - Comments on a task, oldest first
/// - `POST /api/tasks/:task_id/comments/` - Add a comment
/// - `DELETE /api/tasks/:task_id/comments/:comment_id/` - Delete own comment
///
/// Reading and writing comments requires membership of the task's
/// board. Deleting is restricted to the comment's author; even the
/// board owner gets 403 for someone else's comment.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        middleware::AuthContext,
        policy::{comment_decision, BoardAccess, CommentAction},
    },
    models::{
        board::Board,
        comment::{Comment, CreateComment},
        task::Task,
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment body
    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Comment representation
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Comment ID
    pub id: Uuid,

    /// When the comment was written
    pub created_at: DateTime<Utc>,

    /// Author's full name
    pub author: String,

    /// Comment body
    pub content: String,
}

impl CommentResponse {
    async fn load(state: &AppState, comment: Comment) -> ApiResult<Self> {
        let author = User::find_by_id(&state.db, comment.author_id)
            .await?
            .map(|u| u.fullname)
            .unwrap_or_default();

        Ok(Self {
            id: comment.id,
            created_at: comment.created_at,
            author,
            content: comment.content,
        })
    }
}

/// Loads a task's board access snapshot, answering 404 for unknown
/// tasks and invisible boards alike
async fn load_task_access(state: &AppState, task_id: Uuid) -> ApiResult<BoardAccess> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let access = Board::access(&state.db, task.board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(access)
}

/// List a task's comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let access = load_task_access(&state, task_id).await?;
    comment_decision(auth.user_id, &access, auth.user_id, CommentAction::Read).check()?;

    let mut responses = Vec::new();
    for comment in Comment::list_by_task(&state.db, task_id).await? {
        responses.push(CommentResponse::load(&state, comment).await?);
    }
    Ok(Json(responses))
}

/// Add a comment to a task
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let access = load_task_access(&state, task_id).await?;
    comment_decision(auth.user_id, &access, auth.user_id, CommentAction::Create).check()?;

    let comment = Comment::create(
        &state.db,
        CreateComment {
            task_id,
            author_id: auth.user_id,
            content: req.content,
        },
    )
    .await?;

    tracing::info!(comment_id = %comment.id, task_id = %task_id, "Comment created");

    let response = CommentResponse::load(&state, comment).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a comment
///
/// Author only.
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, comment_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let access = load_task_access(&state, task_id).await?;

    let comment = Comment::find_by_id(&state.db, comment_id)
        .await?
        .filter(|c| c.task_id == task_id)
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    comment_decision(auth.user_id, &access, comment.author_id, CommentAction::Delete).check()?;

    Comment::delete(&state.db, comment_id).await?;

    tracing::info!(comment_id = %comment_id, user_id = %auth.user_id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}

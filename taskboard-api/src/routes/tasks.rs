/// Task endpoints
///
/// # Endpoints
///
/// - `POST /api/tasks/` - Create a task on a board
/// - `GET /api/tasks/:task_id/` - Task detail
/// - `PATCH /api/tasks/:task_id/` - Update a task
/// - `DELETE /api/tasks/:task_id/` - Delete a task
/// - `GET /api/tasks/assigned-to-me/` - Tasks assigned to the caller
/// - `GET /api/tasks/reviewing/` - Tasks the caller is reviewing
///
/// Every task operation requires membership of the task's board; a
/// non-member gets 404. Assignee and reviewer must themselves be
/// members of the board.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::UserSummary,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use taskboard_shared::{
    auth::{
        middleware::AuthContext,
        policy::{task_decision, BoardAccess, TaskAction},
    },
    models::{
        board::Board,
        comment::Comment,
        task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Board the task goes on
    pub board: Uuid,

    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Workflow column
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Due date
    pub due_date: NaiveDate,

    /// Assigned user (must be a board member)
    pub assignee_id: Option<Uuid>,

    /// Reviewing user (must be a board member)
    pub reviewer_id: Option<Uuid>,
}

/// Deserializes a nullable patch field so that an absent key and an
/// explicit `null` stay distinguishable
///
/// This runs only when the key is present, so `Some(None)` means
/// "clear the field" while the `#[serde(default)]` outer `None` means
/// "leave it unchanged".
fn nullable_field<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Update task request
///
/// Fields left out of the JSON body stay unchanged; `assignee_id`,
/// `reviewer_id` and `description` distinguish "absent" from an
/// explicit null, which clears the field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// New description (null clears it)
    #[serde(default, deserialize_with = "nullable_field")]
    pub description: Option<Option<String>>,

    /// New workflow column
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New due date
    pub due_date: Option<NaiveDate>,

    /// New assignee (null clears it)
    #[serde(default, deserialize_with = "nullable_field")]
    pub assignee_id: Option<Option<Uuid>>,

    /// New reviewer (null clears it)
    #[serde(default, deserialize_with = "nullable_field")]
    pub reviewer_id: Option<Option<Uuid>>,
}

/// Full task representation with embedded users and comment count
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Board the task belongs to
    pub board: Uuid,

    /// Task title
    pub title: String,

    /// Description, if any
    pub description: Option<String>,

    /// Workflow column
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Assigned user, if any
    pub assignee: Option<UserSummary>,

    /// Reviewing user, if any
    pub reviewer: Option<UserSummary>,

    /// Due date
    pub due_date: NaiveDate,

    /// Number of comments on the task
    pub comments_count: i64,
}

/// Task representation returned by updates (no board or comment count)
#[derive(Debug, Serialize)]
pub struct TaskPatchResponse {
    /// Task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Description, if any
    pub description: Option<String>,

    /// Workflow column
    pub status: TaskStatus,

    /// Priority level
    pub priority: TaskPriority,

    /// Assigned user, if any
    pub assignee: Option<UserSummary>,

    /// Reviewing user, if any
    pub reviewer: Option<UserSummary>,

    /// Due date
    pub due_date: NaiveDate,
}

/// Resolves a user reference to a summary, if set
async fn user_summary(state: &AppState, id: Option<Uuid>) -> ApiResult<Option<UserSummary>> {
    match id {
        Some(id) => Ok(User::find_by_id(&state.db, id).await?.map(UserSummary::from)),
        None => Ok(None),
    }
}

impl TaskResponse {
    /// Assembles the response for a task, resolving users and counting
    /// comments.
    pub async fn load(state: &AppState, task: Task) -> ApiResult<Self> {
        let assignee = user_summary(state, task.assignee_id).await?;
        let reviewer = user_summary(state, task.reviewer_id).await?;
        let comments_count = Comment::count_by_task(&state.db, task.id).await?;

        Ok(Self {
            id: task.id,
            board: task.board_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee,
            reviewer,
            due_date: task.due_date,
            comments_count,
        })
    }
}

impl TaskPatchResponse {
    async fn load(state: &AppState, task: Task) -> ApiResult<Self> {
        let assignee = user_summary(state, task.assignee_id).await?;
        let reviewer = user_summary(state, task.reviewer_id).await?;

        Ok(Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee,
            reviewer,
            due_date: task.due_date,
        })
    }
}

/// Verifies a referenced user is a member of the board
fn check_board_member(access: &BoardAccess, id: Option<Uuid>, field: &str) -> ApiResult<()> {
    if let Some(id) = id {
        if !access.is_member(id) {
            return Err(ApiError::field_error(
                field,
                "User is not a member of this board",
            ));
        }
    }
    Ok(())
}

/// Loads a task together with its board's access snapshot
///
/// A task on an invisible board is indistinguishable from a missing
/// task, both answer 404.
async fn load_task_access(
    state: &AppState,
    task_id: Uuid,
) -> ApiResult<(Task, BoardAccess)> {
    let task = Task::find_by_id(&state.db, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let access = Board::access(&state.db, task.board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok((task, access))
}

/// Create a task
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or assignee/reviewer is not
///   a member of the board
/// - `404 Not Found`: Board does not exist or the caller is not a member
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    req.validate().map_err(ApiError::from_validation)?;

    let access = Board::access(&state.db, req.board)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    task_decision(auth.user_id, &access, TaskAction::Create).check()?;

    check_board_member(&access, req.assignee_id, "assignee_id")?;
    check_board_member(&access, req.reviewer_id, "reviewer_id")?;

    let task = Task::create(
        &state.db,
        CreateTask {
            board_id: req.board,
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
        },
    )
    .await?;

    tracing::info!(task_id = %task.id, board_id = %req.board, "Task created");

    let response = TaskResponse::load(&state, task).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Task detail
///
/// Any member of the task's board may view it.
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let (task, access) = load_task_access(&state, task_id).await?;
    task_decision(auth.user_id, &access, TaskAction::Read).check()?;

    let response = TaskResponse::load(&state, task).await?;
    Ok(Json(response))
}

/// Update a task
///
/// Any member of the task's board may update it.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskPatchResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let (_, access) = load_task_access(&state, task_id).await?;
    task_decision(auth.user_id, &access, TaskAction::Update).check()?;

    check_board_member(&access, req.assignee_id.flatten(), "assignee_id")?;
    check_board_member(&access, req.reviewer_id.flatten(), "reviewer_id")?;

    let task = Task::update(
        &state.db,
        task_id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
            assignee_id: req.assignee_id,
            reviewer_id: req.reviewer_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let response = TaskPatchResponse::load(&state, task).await?;
    Ok(Json(response))
}

/// Delete a task
///
/// Any member of the task's board may delete it.
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let (_, access) = load_task_access(&state, task_id).await?;
    task_decision(auth.user_id, &access, TaskAction::Delete).check()?;

    Task::delete(&state.db, task_id).await?;

    tracing::info!(task_id = %task_id, user_id = %auth.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Tasks assigned to the caller, across all boards
pub async fn assigned_to_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let mut responses = Vec::new();
    for task in Task::list_by_assignee(&state.db, auth.user_id).await? {
        responses.push(TaskResponse::load(&state, task).await?);
    }
    Ok(Json(responses))
}

/// Tasks the caller is reviewing, across all boards
pub async fn reviewing(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let mut responses = Vec::new();
    for task in Task::list_by_reviewer(&state.db, auth.user_id).await? {
        responses.push(TaskResponse::load(&state, task).await?);
    }
    Ok(Json(responses))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.assignee_id.is_none());

        let req: UpdateTaskRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(req.assignee_id, Some(None));

        let id = Uuid::new_v4();
        let body = format!(r#"{{"assignee_id": "{}"}}"#, id);
        let req: UpdateTaskRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.assignee_id, Some(Some(id)));

        // Same for description and reviewer
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"description": null, "reviewer_id": null}"#).unwrap();
        assert_eq!(req.description, Some(None));
        assert_eq!(req.reviewer_id, Some(None));
        assert!(req.title.is_none());
    }

    #[test]
    fn test_create_request_rejects_empty_title() {
        let req = CreateTaskRequest {
            board: Uuid::new_v4(),
            title: "".to_string(),
            description: None,
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            due_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            assignee_id: None,
            reviewer_id: None,
        };
        assert!(req.validate().is_err());
    }
}

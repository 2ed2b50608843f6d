/// Board endpoints
///
/// # Endpoints
///
/// - `GET /api/boards/` - Boards the caller belongs to, with counts
/// - `POST /api/boards/` - Create a board
/// - `GET /api/boards/:board_id/` - Board detail with members and tasks
/// - `PATCH /api/boards/:board_id/` - Update title and/or member set
/// - `DELETE /api/boards/:board_id/` - Delete a board (owner only)
///
/// Access control follows the visibility rule: a caller who is not a
/// member of a board gets 404 for it, never 403. Only deleting is
/// restricted further, to the owner.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{tasks::TaskResponse, UserSummary},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        middleware::AuthContext,
        policy::{board_decision, BoardAction},
    },
    models::{
        board::{Board, BoardSummary, CreateBoard, UpdateBoard},
        task::{Task, TaskPriority, TaskStatus},
        user::User,
    },
};
use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: String,

    /// Member user ids (the caller becomes the owner and a member)
    #[serde(default)]
    pub members: Vec<Uuid>,
}

/// Update board request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// Replacement member set (the owner always stays a member)
    pub members: Option<Vec<Uuid>>,
}

/// Board detail response
#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owning user
    pub owner_id: Uuid,

    /// Board members (owner included)
    pub members: Vec<UserSummary>,

    /// Tasks on the board
    pub tasks: Vec<BoardTaskResponse>,
}

/// Task shape nested in the board detail response
///
/// Same as the full task shape minus the redundant board reference.
#[derive(Debug, Serialize)]
pub struct BoardTaskResponse {
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

    /// Number of comments on the task
    pub comments_count: i64,
}

impl From<TaskResponse> for BoardTaskResponse {
    fn from(task: TaskResponse) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            assignee: task.assignee,
            reviewer: task.reviewer,
            due_date: task.due_date,
            comments_count: task.comments_count,
        }
    }
}

/// Board update response
#[derive(Debug, Serialize)]
pub struct BoardUpdateResponse {
    /// Board ID
    pub id: Uuid,

    /// Board title
    pub title: String,

    /// Owning user
    pub owner_data: UserSummary,

    /// Board members after the update
    pub members_data: Vec<UserSummary>,
}

/// Verifies that every referenced user exists
///
/// Duplicate ids in the request are tolerated.
async fn check_members_exist(state: &AppState, member_ids: &[Uuid]) -> ApiResult<()> {
    let unique: std::collections::HashSet<Uuid> = member_ids.iter().copied().collect();
    let member_ids: Vec<Uuid> = unique.into_iter().collect();

    let users = User::find_by_ids(&state.db, &member_ids).await?;
    if users.len() != member_ids.len() {
        return Err(ApiError::field_error(
            "members",
            "One or more member ids do not exist",
        ));
    }
    Ok(())
}

/// Loads the board's member list as user summaries
async fn member_summaries(state: &AppState, board_id: Uuid) -> ApiResult<Vec<UserSummary>> {
    let ids = Board::member_ids(&state.db, board_id).await?;
    let users = User::find_by_ids(&state.db, &ids).await?;
    Ok(users.into_iter().map(UserSummary::from).collect())
}

/// List the caller's boards
///
/// Returns a summary with membership and task counts for every board
/// the caller is a member of.
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let summaries = Board::summaries_for_member(&state.db, auth.user_id).await?;
    Ok(Json(summaries))
}

/// Create a board
///
/// The caller becomes the owner and is always added as a member.
///
/// # Errors
///
/// - `400 Bad Request`: Empty title or unknown member ids
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<BoardSummary>)> {
    req.validate().map_err(ApiError::from_validation)?;
    check_members_exist(&state, &req.members).await?;

    let board = Board::create(
        &state.db,
        CreateBoard {
            title: req.title,
            owner_id: auth.user_id,
            member_ids: req.members,
        },
    )
    .await?;

    tracing::info!(board_id = %board.id, owner_id = %auth.user_id, "Board created");

    let summary = Board::summary(&state.db, board.id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Board vanished after creation".to_string()))?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Board detail with members and tasks
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetailResponse>> {
    let access = Board::access(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    board_decision(auth.user_id, &access, BoardAction::Read).check()?;

    let board = Board::find_by_id(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let members = member_summaries(&state, board_id).await?;

    let mut tasks = Vec::new();
    for task in Task::list_by_board(&state.db, board_id).await? {
        tasks.push(TaskResponse::load(&state, task).await?.into());
    }

    Ok(Json(BoardDetailResponse {
        id: board.id,
        title: board.title,
        owner_id: board.owner_id,
        members,
        tasks,
    }))
}

/// Update a board's title and/or member set
///
/// Any member may update the board. The owner cannot be removed from
/// the member set.
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<UpdateBoardRequest>,
) -> ApiResult<Json<BoardUpdateResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let access = Board::access(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    board_decision(auth.user_id, &access, BoardAction::Update).check()?;

    if let Some(members) = &req.members {
        check_members_exist(&state, members).await?;
    }

    let board = Board::update(
        &state.db,
        board_id,
        UpdateBoard {
            title: req.title,
            member_ids: req.members,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    let owner = User::find_by_id(&state.db, board.owner_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("Board owner missing".to_string()))?;
    let members = member_summaries(&state, board_id).await?;

    Ok(Json(BoardUpdateResponse {
        id: board.id,
        title: board.title,
        owner_data: owner.into(),
        members_data: members,
    }))
}

/// Delete a board
///
/// Owner only. Tasks and comments on the board are removed with it.
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let access = Board::access(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;
    board_decision(auth.user_id, &access, BoardAction::Delete).check()?;

    Board::delete(&state.db, board_id).await?;

    tracing::info!(board_id = %board_id, user_id = %auth.user_id, "Board deleted");

    Ok(StatusCode::NO_CONTENT)
}

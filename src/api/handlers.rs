//! Route handlers.

use super::UserId;
use super::server::ApiServer;
use crate::error::{ApiError, ApiResult, BackendError, ErrorCode};
use crate::filters::BoardFilter;
use crate::sync::BoardBackend;
use crate::types::{
    Board, BoardUpdate, BoardWithColumns, Column, NewBoard, NewTask, Task, TaskUpdate,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct TitleRequest {
    #[serde(default)]
    title: Option<String>,
}

impl TitleRequest {
    fn require(self) -> ApiResult<String> {
        self.title.ok_or_else(|| ApiError::missing_field("title"))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct MoveRequest {
    #[serde(default)]
    column_id: Option<String>,
    #[serde(default)]
    index: usize,
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorCode::InvalidFieldValue, rejection.body_text())
    }
}

/// Owner lookup result to access decision: missing is 404, someone else's is 403.
fn check_owner(
    owner: anyhow::Result<Option<String>>,
    kind: &'static str,
    id: &str,
    user: &UserId,
) -> ApiResult<()> {
    match owner? {
        None => Err(BackendError::not_found(kind, id).into()),
        Some(owner) if owner == user.0 => Ok(()),
        Some(_) => Err(ApiError::not_owner(kind, id)),
    }
}

pub(super) async fn list_boards(
    State(state): State<ApiServer>,
    user: UserId,
    filter: Result<Query<BoardFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Board>>> {
    let Query(filter) = filter?;
    let boards = state.backend().list_boards(&user.0).await?;
    Ok(Json(filter.apply(boards)))
}

pub(super) async fn create_board(
    State(state): State<ApiServer>,
    user: UserId,
    payload: Result<Json<NewBoard>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(fields) = payload?;
    let board = state.backend().create_board(&user.0, fields).await?;
    tracing::info!(board_id = %board.board.id, user_id = %user.0, "Board created");
    Ok((StatusCode::CREATED, Json(board)))
}

pub(super) async fn get_board(
    State(state): State<ApiServer>,
    user: UserId,
    Path(board_id): Path<String>,
) -> ApiResult<Json<BoardWithColumns>> {
    check_owner(state.db().board_owner(&board_id), "board", &board_id, &user)?;
    let board = state
        .backend()
        .get_board_with_columns_and_tasks(&board_id)
        .await?;
    Ok(Json(board))
}

pub(super) async fn update_board(
    State(state): State<ApiServer>,
    user: UserId,
    Path(board_id): Path<String>,
    payload: Result<Json<BoardUpdate>, JsonRejection>,
) -> ApiResult<Json<Board>> {
    let Json(fields) = payload?;
    check_owner(state.db().board_owner(&board_id), "board", &board_id, &user)?;
    Ok(Json(state.backend().update_board(&board_id, fields).await?))
}

pub(super) async fn delete_board(
    State(state): State<ApiServer>,
    user: UserId,
    Path(board_id): Path<String>,
) -> ApiResult<StatusCode> {
    check_owner(state.db().board_owner(&board_id), "board", &board_id, &user)?;
    state.backend().delete_board(&board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn create_column(
    State(state): State<ApiServer>,
    user: UserId,
    Path(board_id): Path<String>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let title = request.require()?;
    check_owner(state.db().board_owner(&board_id), "board", &board_id, &user)?;
    let column = state
        .backend()
        .create_column(&board_id, &user.0, &title)
        .await?;
    Ok((StatusCode::CREATED, Json(column)))
}

pub(super) async fn rename_column(
    State(state): State<ApiServer>,
    user: UserId,
    Path(column_id): Path<String>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult<Json<Column>> {
    let Json(request) = payload?;
    let title = request.require()?;
    check_owner(state.db().column_owner(&column_id), "column", &column_id, &user)?;
    Ok(Json(
        state
            .backend()
            .update_column_title(&column_id, &title)
            .await?,
    ))
}

pub(super) async fn delete_column(
    State(state): State<ApiServer>,
    user: UserId,
    Path(column_id): Path<String>,
) -> ApiResult<StatusCode> {
    check_owner(state.db().column_owner(&column_id), "column", &column_id, &user)?;
    state.backend().delete_column(&column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn create_task(
    State(state): State<ApiServer>,
    user: UserId,
    Path(column_id): Path<String>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(fields) = payload?;
    check_owner(state.db().column_owner(&column_id), "column", &column_id, &user)?;
    let task = state.backend().create_task(&column_id, fields).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn update_task(
    State(state): State<ApiServer>,
    user: UserId,
    Path(task_id): Path<String>,
    payload: Result<Json<TaskUpdate>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Json(fields) = payload?;
    check_owner(state.db().task_owner(&task_id), "task", &task_id, &user)?;
    Ok(Json(state.backend().update_task(&task_id, fields).await?))
}

pub(super) async fn delete_task(
    State(state): State<ApiServer>,
    user: UserId,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    check_owner(state.db().task_owner(&task_id), "task", &task_id, &user)?;
    state.backend().delete_task(&task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Persist a move and answer with the board as stored afterwards.
pub(super) async fn move_task(
    State(state): State<ApiServer>,
    user: UserId,
    Path(task_id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<Json<BoardWithColumns>> {
    let Json(request) = payload?;
    let column_id = request
        .column_id
        .ok_or_else(|| ApiError::missing_field("column_id"))?;
    check_owner(state.db().task_owner(&task_id), "task", &task_id, &user)?;
    check_owner(state.db().column_owner(&column_id), "column", &column_id, &user)?;

    state
        .backend()
        .persist_move(&task_id, &column_id, request.index)
        .await?;

    let column = state
        .db()
        .get_column(&column_id)?
        .ok_or_else(|| BackendError::not_found("column", &column_id))?;
    let board = state
        .backend()
        .get_board_with_columns_and_tasks(&column.board_id)
        .await?;
    Ok(Json(board))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use boardtalk_core::comment::CreateComment;
use boardtalk_core::task::CreateTask;
use boardtalk_service::DiscussionService;
use serde_json::{json, Value};

use super::{to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/{id}", get(get_task))
        .route(
            "/api/tasks/{id}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/api/tasks/{id}/members", get(list_members))
        .route("/api/tasks/{id}/summary", get(summarize))
}

async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_tasks()
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .get_task(&id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_task(&input)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_comments(&id)
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut input): Json<CreateComment>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    // The path is authoritative for which task the comment lands on.
    input.task_id = id;
    state
        .service
        .create_comment(&input)
        .await
        .map(|c| (StatusCode::CREATED, Json(json!(c))))
        .map_err(to_error)
}

async fn list_members(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_board_members(&id)
        .await
        .map(|m| Json(json!(m)))
        .map_err(to_error)
}

async fn summarize(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .summarize_thread(&id)
        .await
        .map(|s| Json(json!(s)))
        .map_err(to_error)
}

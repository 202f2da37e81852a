use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use boardtalk_core::attachment::{FileUpload, UploadAttachment};
use boardtalk_core::comment::UpdateComment;
use boardtalk_service::{DiscussionService, ServiceError};
use serde_json::{json, Value};

use super::{to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/comments/{id}", put(update_comment).delete(delete_comment))
        .route("/api/comments/{id}/attachments", post(upload_attachment))
        .route(
            "/api/comments/{id}/attachments/{index}",
            axum::routing::delete(delete_attachment),
        )
}

async fn update_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateComment>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .update_comment(&id, &input)
        .await
        .map(|c| Json(json!(c)))
        .map_err(to_error)
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_comment(&id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UploadAttachment>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let bytes = B64
        .decode(&input.data)
        .map_err(|e| to_error(ServiceError::InvalidInput(format!("bad base64 data: {e}"))))?;
    let upload = FileUpload {
        file_name: input.file_name,
        content_type: input.content_type,
        uploaded_by: input.uploaded_by,
        bytes,
    };
    state
        .service
        .upload_attachment(&id, &upload)
        .await
        .map(|a| (StatusCode::CREATED, Json(json!(a))))
        .map_err(to_error)
}

async fn delete_attachment(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    state
        .service
        .delete_attachment(&id, index)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(to_error)
}

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use boardtalk_service::ServiceError;
use serde_json::Value;

use super::{to_error, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/attachments/{id}/download", get(download))
}

async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let bytes = state.service.attachment_bytes(&id).map_err(to_error)?;
    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes))
        .map_err(|e| to_error(ServiceError::Internal(format!("build response: {e}"))))
}

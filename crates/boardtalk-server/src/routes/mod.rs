pub mod attachments;
pub mod comments;
pub mod health;
pub mod tasks;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use boardtalk_service::{LocalService, ServiceError};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub struct InnerAppState {
    pub service: LocalService,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(service: LocalService) -> Router {
    let state: AppState = Arc::new(InnerAppState { service });

    Router::new()
        .merge(health::routes())
        .merge(tasks::routes())
        .merge(comments::routes())
        .merge(attachments::routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub(crate) fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Network(_) | ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

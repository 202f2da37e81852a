//! Helpers for integration tests: an in-process router over a fresh
//! in-memory board, and a real listener on a random port.

use axum::Router;
use boardtalk_service::LocalService;
use tokio::net::TcpListener;

/// Build a test router over a fresh in-memory board, returning the service
/// handle as well so tests can reach the event bus behind the API.
pub fn test_router() -> (Router, LocalService) {
    let service = LocalService::new();
    let router = crate::routes::build_router(service.clone());
    (router, service)
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    pub service: LocalService,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port. Returns the TestServer
/// with the `base_url` (e.g. "http://127.0.0.1:12345").
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let (app, service) = test_router();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        service,
        _handle: handle,
    }
}

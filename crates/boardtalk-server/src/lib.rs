pub mod routes;
pub mod test_helpers;

use anyhow::Result;
use boardtalk_service::LocalService;
use tokio::net::TcpListener;

/// Serve the board API over the given listener until the task is dropped.
/// The service is shared, so a TUI embedding this in-process sees mutations
/// made by remote clients on the same event bus.
pub async fn serve(listener: TcpListener, service: LocalService) -> Result<()> {
    let app = routes::build_router(service);
    axum::serve(listener, app).await?;
    Ok(())
}

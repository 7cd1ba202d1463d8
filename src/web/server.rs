//! HTTP server implementation

use axum::{
    routing::{get, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{
    delete_object, liveness_handler, metrics_handler, read_object, readiness_handler,
    stats_handler, write_object,
};
use crate::store::StorageEngine;

/// Build the application router
pub fn router(engine: Arc<StorageEngine>) -> Router {
    Router::new()
        .route(
            "/objects/:key",
            put(write_object).get(read_object).delete(delete_object),
        )
        .route("/probes/liveness", get(liveness_handler))
        .route("/probes/readiness", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

/// Run the web server until `shutdown` is cancelled
pub async fn run_web_server(
    addr: SocketAddr,
    engine: Arc<StorageEngine>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP interface available at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}

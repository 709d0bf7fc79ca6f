use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::daemon::MemoryDaemon;
use crate::handler;

/// Build the axum router serving `daemon`.
pub fn build_router(daemon: MemoryDaemon) -> Router {
    Router::new()
        .route("/probe", get(handler::probe_handler))
        .route("/feed/:endpoint", post(handler::feed_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(daemon)
}

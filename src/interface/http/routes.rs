use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::adapters::SampleStore;

use super::handlers::{
    best_handler, health_handler, history_handler, status_handler, stream_handler, AppState,
};

/// Build the API router; `static_dir` is served for every other path
pub fn create_router(store: Arc<SampleStore>, static_dir: Option<PathBuf>) -> Router {
    let state = AppState { store };

    let router = Router::new()
        // API routes
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/api/best", get(best_handler))
        .route("/api/history/{iface}", get(history_handler))
        .route("/api/stream", get(stream_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

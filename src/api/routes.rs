use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;
    let static_files = ServeDir::new(&state.config.paths.static_dir);

    Router::new()
        // Pages
        .route("/", get(handlers::index))
        .route(
            "/upload",
            post(handlers::upload)
                .fallback(handlers::method_not_allowed)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Report download
        .route("/downloads/:name", get(handlers::download_report))
        // Static assets
        .nest_service("/static", static_files)
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

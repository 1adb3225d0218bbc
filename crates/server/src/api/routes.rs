use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use super::middleware::{auth_middleware, metrics_middleware};
use super::{convert, files, handlers};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Dashboard static files path (configurable via env)
    let dashboard_dir =
        std::env::var("DASHBOARD_DIR").unwrap_or_else(|_| "dashboard/dist".to_string());
    let max_upload_bytes = state.config().server.max_upload_bytes;

    // Routes that need an authenticated user
    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        // Conversion
        .route("/formats", get(convert::list_formats))
        .route("/convert", post(convert::convert))
        // File library
        .route("/files", get(files::list_files).post(files::add_file))
        .route("/files/{id}", get(files::get_file).delete(files::remove_file))
        .route("/files/{id}/processed", post(files::mark_processed))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware,
        ));

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    // Serve dashboard with SPA fallback
    let index_path = format!("{}/index.html", dashboard_dir);
    let serve_dir = ServeDir::new(&dashboard_dir).fallback(ServeFile::new(&index_path));

    Router::new()
        .route("/metrics", get(handlers::metrics))
        .nest("/api/v1", api_routes)
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

use std::path::PathBuf;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::store::DocumentStore;

pub mod config;
pub mod data;

/// Shared per-request context. The store re-resolves its file path on every
/// call, so a path reconfiguration takes effect immediately without any
/// process-wide mutable state.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub assets_dir: PathBuf,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Fallback for paths that match no API route and no static asset: serve
/// `index.html` so client-side routing works, or a plain-text notice when
/// the frontend bundle has not been built.
async fn spa_index(State(state): State<AppState>) -> Response {
    match tokio::fs::read(state.assets_dir.join("index.html")).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(_) => (
            StatusCode::OK,
            "API server running. Frontend not built; expected assets under 'dist'.",
        )
            .into_response(),
    }
}

/// Build the full application router: data and config API plus static assets.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let spa = get(spa_index).with_state(state.clone());
    let static_dir = ServeDir::new(&state.assets_dir).fallback(spa);

    Router::new()
        .route("/api/data", get(data::get_data).post(data::save_data))
        .route(
            "/api/config/db-path",
            get(config::get_db_path).post(config::set_db_path),
        )
        .route("/health", get(health))
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

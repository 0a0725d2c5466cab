//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{self, DownloadQuery, GradeBody, ParseBody, RetouchBody};
use crate::assets::AssetLoader;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{InMemorySessionStore, KeywordParser, ProcessingService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<InMemorySessionStore>,
    pub processing: Arc<ProcessingService>,
}

/// Create application state from an asset loader.
pub fn create_app_state(asset_loader: Arc<AssetLoader>) -> anyhow::Result<AppState> {
    let config = Arc::new(AppConfig::load_from_assets(&asset_loader));
    Ok(create_app_state_with_config(config))
}

/// Create application state around an already loaded configuration.
pub fn create_app_state_with_config(config: Arc<AppConfig>) -> AppState {
    let sessions = Arc::new(InMemorySessionStore::with_limits(
        config.limits.max_sessions,
        config.limits.session_idle_ttl(),
    ));
    let processing = Arc::new(ProcessingService::new(
        config.clone(),
        sessions.clone(),
        Arc::new(KeywordParser::new()),
    ));

    AppState {
        config,
        sessions,
        processing,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    // One byte of headroom so oversize uploads reach the handler and get a JSON 413
    let body_limit = state.config.limits.max_upload_bytes.saturating_add(1);

    Router::new()
        .route("/api/images", post(handle_upload))
        .route(
            "/api/images/:id",
            get(handle_get_session).delete(handle_delete),
        )
        .route("/api/images/:id/retouch", post(handle_retouch))
        .route("/api/images/:id/grade", post(handle_grade))
        .route("/api/images/:id/reset", post(handle_reset))
        .route("/api/images/:id/download", get(handle_download))
        .route("/api/presets", get(handle_list_presets))
        .route("/api/parse", post(handle_parse))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(body_limit))
        // Add state and tracing
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_upload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    api::handle_upload(State(state.processing), body).await
}

async fn handle_get_session(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Json<api::SessionSummary>, ApiError> {
    api::handle_get_session(State(state.processing), path).await
}

async fn handle_delete(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<StatusCode, ApiError> {
    api::handle_delete(State(state.processing), path).await
}

async fn handle_retouch(
    State(state): State<AppState>,
    path: Path<String>,
    body: Json<RetouchBody>,
) -> Result<Json<api::RetouchResponse>, ApiError> {
    api::handle_retouch(State(state.processing), path, body).await
}

async fn handle_grade(
    State(state): State<AppState>,
    path: Path<String>,
    body: Json<GradeBody>,
) -> Result<Json<api::GradeResponse>, ApiError> {
    api::handle_grade(State(state.processing), path, body).await
}

async fn handle_reset(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Json<api::SessionSummary>, ApiError> {
    api::handle_reset(State(state.processing), path).await
}

async fn handle_download(
    State(state): State<AppState>,
    path: Path<String>,
    query: Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    api::handle_download(State(state.processing), path, query).await
}

async fn handle_list_presets(State(state): State<AppState>) -> Json<Vec<crate::models::Preset>> {
    api::handle_list_presets(State(state.processing)).await
}

async fn handle_parse(
    State(state): State<AppState>,
    body: Json<ParseBody>,
) -> Result<Json<api::ParseResponse>, ApiError> {
    api::handle_parse(State(state.processing), body).await
}

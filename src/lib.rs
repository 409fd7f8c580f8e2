//! Media board API: REST CRUD over uploaded images, AI-generated images,
//! liuma short-video media, a YeQi guestbook and a weighted lucky-draw list.

pub mod api;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod storage;
pub mod system;

use std::time::Duration;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::common::tracing::{make_request_span, on_failure, on_request, on_response};
use crate::config::AppConfig;
use crate::storage::{FileStorage, PUBLIC_PREFIX};

/// State shared by every handler.
#[derive(Clone)]
pub struct InnerState {
    pub db: SqlitePool,
    pub storage: FileStorage,
    pub query_timeout: Duration,
}

impl InnerState {
    pub fn new(db: SqlitePool, config: &AppConfig) -> Self {
        Self {
            db,
            storage: FileStorage::new(config.upload_dir.clone()),
            query_timeout: config.query_timeout,
        }
    }
}

/// Builds the full application router: resource APIs, static uploads,
/// health check and the shared middleware stack.
pub fn build_app(state: InnerState, config: &AppConfig) -> Router {
    let uploads = ServeDir::new(state.storage.root().to_path_buf());

    Router::new()
        .merge(system::create_system_router())
        .merge(api::create_api_router())
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span::<Body>)
                .on_request(on_request::<Body>)
                .on_response(on_response::<Body>)
                .on_failure(on_failure),
        )
        .with_state(state)
}

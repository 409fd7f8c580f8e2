//! Resource routers, one module per table.
//!
//! Every resource lives under its own `/api/...` prefix and shares the
//! listing, upload and error conventions in [`common`].

pub mod ai_images;
pub mod common;
pub mod images;
pub mod liuma_media;
pub mod lucky_draw;
pub mod messages;

use axum::Router;

use crate::InnerState;

/// Creates the router holding every resource API
#[tracing::instrument(name = "create_api_router")]
pub fn create_api_router() -> Router<InnerState> {
    tracing::info!("Creating resource API router");

    Router::new()
        .nest("/api/images", images::router())
        .nest("/api/aiImages", ai_images::router())
        .nest("/api/liuma-media", liuma_media::router())
        .nest("/api/YeQiMessage", messages::router())
        .nest("/api/luckyDraw", lucky_draw::router())
}

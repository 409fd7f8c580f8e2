//! `/api/liuma-media`: cover image plus optional video for liuma clips.
//!
//! Uploads here are limited to JPEG, PNG and GIF up to 10 MiB.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_typed_multipart::{TypedMultipart, TypedMultipartError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::common::extract::{EntityId, JsonObject};
use crate::api::common::upload::{UploadForm, UploadPolicy};
use crate::api::common::utils::{timeout_find, timeout_query};
use crate::api::common::{
    lenient_int, non_blank, require_text, validate_orientation, BulkDeleteResponse, ListParams,
    PaginationInfo,
};
use crate::entities::liuma_media::{
    self, LiumaMedia, LiumaMediaChanges, LiumaMediaSort, NewLiumaMedia,
};
use crate::errors::AppError;
use crate::storage::Bucket;
use crate::InnerState;

const ENTITY: &str = "Media";

#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub orientation: Option<i64>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMediaRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub orientation: Option<i64>,
    pub video_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MediaListResponse {
    pub total: i64,
    pub media: Vec<LiumaMedia>,
    pub pagination: PaginationInfo,
}

pub fn router() -> Router<InnerState> {
    Router::new()
        .route("/", get(all_media).post(create_media).delete(delete_all_media))
        .route("/deleteAll", delete(delete_all_media))
        .route("/upload", post(upload_media_image))
        .route("/:id", get(get_media).put(update_media).delete(delete_media))
        .route("/:id/like", post(like_media))
}

#[tracing::instrument(name = "Upload liuma image", skip(inner, form))]
pub async fn upload_media_image(
    State(inner): State<InnerState>,
    form: Result<TypedMultipart<UploadForm>, TypedMultipartError>,
) -> Result<Json<Value>, AppError> {
    let InnerState { storage, .. } = inner;
    let TypedMultipart(form) = form?;

    let file = UploadPolicy::WEB_IMAGES.accept(form.image)?;
    tracing::debug!(content_type = ?file.content_type, "Accepted liuma image");

    let stored = storage
        .store(Bucket::LiumaMedia, file.file_name.as_deref(), &file.contents)
        .await?;

    Ok(Json(json!({ "image_url": stored.public_path })))
}

#[tracing::instrument(name = "Create liuma media", skip(inner, payload))]
pub async fn create_media(
    State(inner): State<InnerState>,
    JsonObject(payload): JsonObject<CreateMediaRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let new_media = NewLiumaMedia {
        image_url: require_text(payload.image_url, "image_url")?,
        title: require_text(payload.title, "title")?,
        video_url: payload.video_url.filter(|v| !v.trim().is_empty()),
        orientation: validate_orientation(
            payload.orientation.unwrap_or(liuma_media::DEFAULT_ORIENTATION),
        )?,
    };

    let media = timeout_query(query_timeout, liuma_media::insert(&db, &new_media)).await?;
    tracing::info!(id = media.id, "Liuma media record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Media record created successfully", "data": media })),
    ))
}

#[tracing::instrument(name = "List liuma media", skip(inner))]
pub async fn all_media(
    State(inner): State<InnerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<MediaListResponse>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;
    let query = params.validate::<LiumaMediaSort>()?;

    let media = timeout_query(query_timeout, liuma_media::list(&db, &query)).await?;
    let total = timeout_query(query_timeout, liuma_media::count(&db)).await?;

    Ok(Json(MediaListResponse {
        total,
        media,
        pagination: query.pagination(total),
    }))
}

#[tracing::instrument(name = "Get liuma media", skip(inner))]
pub async fn get_media(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<LiumaMedia>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let media = timeout_find(query_timeout, ENTITY, id, liuma_media::find_by_id(&db, id)).await?;
    Ok(Json(media))
}

#[tracing::instrument(name = "Update liuma media", skip(inner, payload))]
pub async fn update_media(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
    JsonObject(payload): JsonObject<UpdateMediaRequest>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let changes = LiumaMediaChanges {
        title: non_blank(payload.title, "title")?,
        orientation: payload.orientation.map(validate_orientation).transpose()?,
        video_url: payload.video_url,
    };

    let media = timeout_find(
        query_timeout,
        ENTITY,
        id,
        liuma_media::update(&db, id, &changes),
    )
    .await?;
    Ok(Json(json!({ "message": "Media updated successfully!", "media": media })))
}

#[tracing::instrument(name = "Delete liuma media", skip(inner))]
pub async fn delete_media(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let media = timeout_find(query_timeout, ENTITY, id, liuma_media::find_by_id(&db, id)).await?;

    storage.remove(Bucket::LiumaMedia, &media.image_url).await?;

    if !timeout_query(query_timeout, liuma_media::delete(&db, id)).await? {
        return Err(AppError::NotFound(format!("{} {} not found", ENTITY, id)));
    }

    Ok(Json(json!({ "message": "Media deleted successfully" })))
}

#[tracing::instrument(name = "Delete all liuma media", skip(inner))]
pub async fn delete_all_media(
    State(inner): State<InnerState>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let paths = timeout_query(query_timeout, liuma_media::all_paths(&db)).await?;
    let files = storage.remove_all(Bucket::LiumaMedia, &paths).await;
    let deleted = timeout_query(query_timeout, liuma_media::delete_all(&db)).await?;

    tracing::info!(deleted, "Deleted all liuma media");

    Ok(Json(BulkDeleteResponse {
        message: "All liuma media deleted".to_string(),
        deleted,
        files,
    }))
}

#[tracing::instrument(name = "Like liuma media", skip(inner))]
pub async fn like_media(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let media = timeout_find(
        query_timeout,
        ENTITY,
        id,
        liuma_media::increment_likes(&db, id),
    )
    .await?;
    Ok(Json(json!({ "message": "Media liked successfully!", "media": media })))
}

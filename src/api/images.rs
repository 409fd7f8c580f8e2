//! `/api/images`: uploaded photos queued for printing.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_typed_multipart::{TypedMultipart, TypedMultipartError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::common::extract::{EntityId, JsonObject};
use crate::api::common::upload::{UploadForm, UploadPolicy};
use crate::api::common::utils::{timeout_find, timeout_query};
use crate::api::common::{BulkDeleteResponse, ListParams, PaginationInfo};
use crate::entities::images::{self, Image, ImageChanges, ImageSort, ImageStatus};
use crate::errors::AppError;
use crate::storage::Bucket;
use crate::InnerState;

const ENTITY: &str = "Image";

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub description: Option<String>,
    pub status: Option<ImageStatus>,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<Image>,
    pub total: i64,
    pub pagination: PaginationInfo,
}

pub fn router() -> Router<InnerState> {
    Router::new()
        .route("/", get(all_images).delete(delete_all_images))
        .route("/upload", post(upload_image))
        .route("/:id", get(get_image).put(update_image).delete(delete_image))
        .route("/:id/like", post(like_image))
}

/// Stores the file and creates its row in one call.
#[tracing::instrument(name = "Upload image", skip(inner, form))]
pub async fn upload_image(
    State(inner): State<InnerState>,
    form: Result<TypedMultipart<UploadForm>, TypedMultipartError>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let InnerState { db, storage, query_timeout } = inner;
    let TypedMultipart(form) = form?;

    let file = UploadPolicy::UNRESTRICTED.accept(form.image)?;
    let description = form.description.filter(|d| !d.trim().is_empty());

    let stored = storage
        .store(Bucket::Images, file.file_name.as_deref(), &file.contents)
        .await?;

    let image = match timeout_query(
        query_timeout,
        images::insert(&db, &stored.public_path, description.as_deref()),
    )
    .await
    {
        Ok(image) => image,
        Err(e) => {
            // Do not leave an orphaned file behind a failed insert
            if let Err(cleanup) = storage.remove(Bucket::Images, &stored.public_path).await {
                tracing::error!(error = %cleanup, "Failed to remove file after insert failure");
            }
            return Err(e);
        }
    };

    tracing::info!(id = image.id, size = stored.size, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Image uploaded successfully!", "image": image })),
    ))
}

#[tracing::instrument(name = "List images", skip(inner))]
pub async fn all_images(
    State(inner): State<InnerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ImageListResponse>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;
    let query = params.validate::<ImageSort>()?;

    let images = timeout_query(query_timeout, images::list(&db, &query)).await?;
    let total = timeout_query(query_timeout, images::count(&db)).await?;

    Ok(Json(ImageListResponse {
        images,
        total,
        pagination: query.pagination(total),
    }))
}

#[tracing::instrument(name = "Get image", skip(inner))]
pub async fn get_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, images::find_by_id(&db, id)).await?;
    Ok(Json(json!({ "image": image })))
}

#[tracing::instrument(name = "Update image", skip(inner, payload))]
pub async fn update_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
    JsonObject(payload): JsonObject<UpdateImageRequest>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let changes = ImageChanges {
        description: payload.description,
        status: payload.status,
    };

    let image = timeout_find(query_timeout, ENTITY, id, images::update(&db, id, &changes)).await?;
    Ok(Json(json!({ "message": "Image updated successfully!", "image": image })))
}

#[tracing::instrument(name = "Delete image", skip(inner))]
pub async fn delete_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, images::find_by_id(&db, id)).await?;

    storage.remove(Bucket::Images, &image.file_path).await?;

    if !timeout_query(query_timeout, images::delete(&db, id)).await? {
        return Err(AppError::NotFound(format!("{} {} not found", ENTITY, id)));
    }

    Ok(Json(json!({ "message": "Image deleted successfully!" })))
}

#[tracing::instrument(name = "Delete all images", skip(inner))]
pub async fn delete_all_images(
    State(inner): State<InnerState>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let paths = timeout_query(query_timeout, images::all_paths(&db)).await?;
    let files = storage.remove_all(Bucket::Images, &paths).await;
    let deleted = timeout_query(query_timeout, images::delete_all(&db)).await?;

    tracing::info!(deleted, "Deleted all images");

    Ok(Json(BulkDeleteResponse {
        message: "All images deleted".to_string(),
        deleted,
        files,
    }))
}

#[tracing::instrument(name = "Like image", skip(inner))]
pub async fn like_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, images::increment_likes(&db, id)).await?;
    Ok(Json(json!({ "message": "Image liked successfully!", "image": image })))
}

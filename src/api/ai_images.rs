//! `/api/aiImages`: AI-generated images with free-text search on the name.

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
use crate::api::common::{
    lenient_int, non_blank, require_text, validate_orientation, BulkDeleteResponse, ListParams,
    PaginationInfo,
};
use crate::entities::ai_images::{self, AiImage, AiImageChanges, AiImageSort, NewAiImage};
use crate::errors::AppError;
use crate::storage::Bucket;
use crate::InnerState;

const ENTITY: &str = "AI image";

#[derive(Debug, Deserialize)]
pub struct CreateAiImageRequest {
    pub image_name: Option<String>,
    pub image_path: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub orientation: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAiImageRequest {
    pub image_name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub orientation: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AiImageListResponse {
    pub data: Vec<AiImage>,
    pub total: i64,
    pub pagination: PaginationInfo,
}

pub fn router() -> Router<InnerState> {
    Router::new()
        .route(
            "/",
            get(all_ai_images)
                .post(create_ai_image)
                .delete(delete_all_ai_images),
        )
        .route("/upload", post(upload_ai_image))
        .route("/upload-ai-image", post(upload_ai_image))
        .route(
            "/:id",
            get(get_ai_image).put(update_ai_image).delete(delete_ai_image),
        )
        .route("/:id/like", post(like_ai_image))
}

#[tracing::instrument(name = "Upload AI image file", skip(inner, form))]
pub async fn upload_ai_image(
    State(inner): State<InnerState>,
    form: Result<TypedMultipart<UploadForm>, TypedMultipartError>,
) -> Result<Json<Value>, AppError> {
    let InnerState { storage, .. } = inner;
    let TypedMultipart(form) = form?;

    let file = UploadPolicy::UNRESTRICTED.accept(form.image)?;
    let stored = storage
        .store(Bucket::AiImages, file.file_name.as_deref(), &file.contents)
        .await?;

    Ok(Json(json!({
        "message": "Image uploaded successfully",
        "imagePath": stored.public_path,
    })))
}

#[tracing::instrument(name = "Create AI image", skip(inner, payload))]
pub async fn create_ai_image(
    State(inner): State<InnerState>,
    JsonObject(payload): JsonObject<CreateAiImageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let new_image = NewAiImage {
        image_name: require_text(payload.image_name, "image_name")?,
        image_path: require_text(payload.image_path, "image_path")?,
        description: payload.description,
        orientation: validate_orientation(
            payload.orientation.unwrap_or(ai_images::DEFAULT_ORIENTATION),
        )?,
    };

    let image = timeout_query(query_timeout, ai_images::insert(&db, &new_image)).await?;
    tracing::info!(id = image.id, "AI image record created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "AI image created successfully", "data": image })),
    ))
}

#[tracing::instrument(name = "List AI images", skip(inner))]
pub async fn all_ai_images(
    State(inner): State<InnerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AiImageListResponse>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;
    let query = params.validate::<AiImageSort>()?;

    let data = timeout_query(query_timeout, ai_images::list(&db, &query)).await?;
    let total = timeout_query(query_timeout, ai_images::count(&db, query.search.as_deref())).await?;

    Ok(Json(AiImageListResponse {
        data,
        total,
        pagination: query.pagination(total),
    }))
}

#[tracing::instrument(name = "Get AI image", skip(inner))]
pub async fn get_ai_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, ai_images::find_by_id(&db, id)).await?;
    Ok(Json(json!({ "data": image })))
}

#[tracing::instrument(name = "Update AI image", skip(inner, payload))]
pub async fn update_ai_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
    JsonObject(payload): JsonObject<UpdateAiImageRequest>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let changes = AiImageChanges {
        image_name: non_blank(payload.image_name, "image_name")?,
        description: payload.description,
        orientation: payload.orientation.map(validate_orientation).transpose()?,
    };

    let image = timeout_find(
        query_timeout,
        ENTITY,
        id,
        ai_images::update(&db, id, &changes),
    )
    .await?;
    Ok(Json(json!({ "message": "AI image updated successfully", "data": image })))
}

#[tracing::instrument(name = "Delete AI image", skip(inner))]
pub async fn delete_ai_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, ai_images::find_by_id(&db, id)).await?;

    storage.remove(Bucket::AiImages, &image.image_path).await?;

    if !timeout_query(query_timeout, ai_images::delete(&db, id)).await? {
        return Err(AppError::NotFound(format!("{} {} not found", ENTITY, id)));
    }

    Ok(Json(json!({ "message": "AI image deleted successfully" })))
}

#[tracing::instrument(name = "Delete all AI images", skip(inner))]
pub async fn delete_all_ai_images(
    State(inner): State<InnerState>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let InnerState { db, storage, query_timeout } = inner;

    let paths = timeout_query(query_timeout, ai_images::all_paths(&db)).await?;
    let files = storage.remove_all(Bucket::AiImages, &paths).await;
    let deleted = timeout_query(query_timeout, ai_images::delete_all(&db)).await?;

    tracing::info!(deleted, "Deleted all AI images");

    Ok(Json(BulkDeleteResponse {
        message: "All AI images deleted".to_string(),
        deleted,
        files,
    }))
}

#[tracing::instrument(name = "Like AI image", skip(inner))]
pub async fn like_ai_image(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let image = timeout_find(query_timeout, ENTITY, id, ai_images::increment_likes(&db, id)).await?;
    Ok(Json(json!({ "message": "Image liked successfully!", "image": image })))
}

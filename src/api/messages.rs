//! `/api/YeQiMessage`: the guestbook.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::common::extract::{EntityId, JsonObject};
use crate::api::common::utils::{timeout_find, timeout_query};
use crate::api::common::{non_blank, require_text, ListParams, PaginationInfo};
use crate::entities::messages::{self, Message, MessageSort};
use crate::errors::AppError;
use crate::InnerState;

const ENTITY: &str = "Message";

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    pub success: bool,
    pub data: Vec<Message>,
    pub total: i64,
    pub pagination: PaginationInfo,
}

pub fn router() -> Router<InnerState> {
    Router::new()
        .route(
            "/",
            get(all_messages).post(create_message).delete(delete_all_messages),
        )
        .route(
            "/:id",
            get(get_message).put(update_message).delete(delete_message),
        )
}

#[tracing::instrument(name = "List messages", skip(inner))]
pub async fn all_messages(
    State(inner): State<InnerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<MessageListResponse>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;
    let query = params.validate::<MessageSort>()?;

    let data = timeout_query(query_timeout, messages::list(&db, &query)).await?;
    let total = timeout_query(query_timeout, messages::count(&db)).await?;

    Ok(Json(MessageListResponse {
        success: true,
        data,
        total,
        pagination: query.pagination(total),
    }))
}

#[tracing::instrument(name = "Get message", skip(inner))]
pub async fn get_message(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let message = timeout_find(query_timeout, ENTITY, id, messages::find_by_id(&db, id)).await?;
    Ok(Json(json!({ "success": true, "data": message })))
}

#[tracing::instrument(name = "Create message", skip(inner, payload))]
pub async fn create_message(
    State(inner): State<InnerState>,
    JsonObject(payload): JsonObject<MessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let name = require_text(payload.name, "name")?;
    let content = require_text(payload.content, "content")?;

    let message = timeout_query(query_timeout, messages::insert(&db, &name, &content)).await?;
    tracing::info!(id = message.id, "Message posted");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": message })),
    ))
}

#[tracing::instrument(name = "Update message", skip(inner, payload))]
pub async fn update_message(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
    JsonObject(payload): JsonObject<MessageRequest>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let name = non_blank(payload.name, "name")?;
    let content = non_blank(payload.content, "content")?;
    if name.is_none() && content.is_none() {
        return Err(AppError::Validation(
            "name or content is required".to_string(),
        ));
    }

    let message = timeout_find(
        query_timeout,
        ENTITY,
        id,
        messages::update(&db, id, name.as_deref(), content.as_deref()),
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": message })))
}

#[tracing::instrument(name = "Delete message", skip(inner))]
pub async fn delete_message(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    if !timeout_query(query_timeout, messages::delete(&db, id)).await? {
        return Err(AppError::NotFound(format!("{} {} not found", ENTITY, id)));
    }

    Ok(Json(json!({ "success": true, "message": "Message deleted" })))
}

#[tracing::instrument(name = "Delete all messages", skip(inner))]
pub async fn delete_all_messages(
    State(inner): State<InnerState>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let deleted = timeout_query(query_timeout, messages::delete_all(&db)).await?;
    tracing::info!(deleted, "Cleared guestbook");

    Ok(Json(json!({
        "success": true,
        "message": format!("Deleted {} messages", deleted),
        "deleted": deleted,
    })))
}

//! `/api/luckyDraw`: raffle participants and the weighted draw.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::common::extract::{EntityId, JsonObject};
use crate::api::common::utils::{timeout_find, timeout_query};
use crate::api::common::{lenient_int, non_blank, require_text, ListParams, PaginationInfo};
use crate::entities::lucky_draw::{self, Participant, ParticipantSort};
use crate::errors::AppError;
use crate::InnerState;

const ENTITY: &str = "Participant";

#[derive(Debug, Deserialize)]
pub struct ParticipantRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub weight: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantListResponse {
    pub participants: Vec<Participant>,
    pub total: i64,
    pub pagination: PaginationInfo,
}

pub fn router() -> Router<InnerState> {
    Router::new()
        .route(
            "/",
            get(all_participants)
                .post(create_participant)
                .delete(delete_all_participants),
        )
        .route("/draw", post(draw_participant))
        .route(
            "/:id",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
        .route("/:id/like", post(like_participant))
}

fn validate_weight(weight: i64) -> Result<i64, AppError> {
    if !(1..=lucky_draw::MAX_WEIGHT).contains(&weight) {
        return Err(AppError::Validation(format!(
            "weight must be between 1 and {}, got {}",
            lucky_draw::MAX_WEIGHT,
            weight
        )));
    }
    Ok(weight)
}

#[tracing::instrument(name = "Create participant", skip(inner, payload))]
pub async fn create_participant(
    State(inner): State<InnerState>,
    JsonObject(payload): JsonObject<ParticipantRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let name = require_text(payload.name, "name")?;
    let weight = validate_weight(payload.weight.unwrap_or(lucky_draw::DEFAULT_WEIGHT))?;

    let participant = timeout_query(query_timeout, lucky_draw::insert(&db, &name, weight)).await?;
    tracing::info!(id = participant.id, weight, "Participant created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Participant created successfully!",
            "participant": participant,
        })),
    ))
}

#[tracing::instrument(name = "List participants", skip(inner))]
pub async fn all_participants(
    State(inner): State<InnerState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ParticipantListResponse>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;
    let query = params.validate::<ParticipantSort>()?;

    let participants = timeout_query(query_timeout, lucky_draw::list(&db, &query)).await?;
    let total = timeout_query(query_timeout, lucky_draw::count(&db)).await?;

    Ok(Json(ParticipantListResponse {
        participants,
        total,
        pagination: query.pagination(total),
    }))
}

#[tracing::instrument(name = "Get participant", skip(inner))]
pub async fn get_participant(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let participant =
        timeout_find(query_timeout, ENTITY, id, lucky_draw::find_by_id(&db, id)).await?;
    Ok(Json(json!({ "participant": participant })))
}

#[tracing::instrument(name = "Update participant", skip(inner, payload))]
pub async fn update_participant(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
    JsonObject(payload): JsonObject<ParticipantRequest>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let name = non_blank(payload.name, "name")?;
    let weight = payload.weight.map(validate_weight).transpose()?;

    let participant = timeout_find(
        query_timeout,
        ENTITY,
        id,
        lucky_draw::update(&db, id, name.as_deref(), weight),
    )
    .await?;

    Ok(Json(json!({
        "message": "Participant updated successfully!",
        "participant": participant,
    })))
}

#[tracing::instrument(name = "Delete participant", skip(inner))]
pub async fn delete_participant(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    if !timeout_query(query_timeout, lucky_draw::delete(&db, id)).await? {
        return Err(AppError::NotFound(format!("{} {} not found", ENTITY, id)));
    }

    Ok(Json(json!({ "message": "Participant deleted successfully!" })))
}

#[tracing::instrument(name = "Delete all participants", skip(inner))]
pub async fn delete_all_participants(
    State(inner): State<InnerState>,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let deleted = timeout_query(query_timeout, lucky_draw::delete_all(&db)).await?;
    tracing::info!(deleted, "Cleared lucky draw");

    Ok(Json(json!({
        "message": format!("Deleted {} participants successfully!", deleted),
        "deleted": deleted,
    })))
}

#[tracing::instrument(name = "Like participant", skip(inner))]
pub async fn like_participant(
    State(inner): State<InnerState>,
    EntityId(id): EntityId,
) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let participant =
        timeout_find(query_timeout, ENTITY, id, lucky_draw::increment_likes(&db, id)).await?;
    Ok(Json(json!({
        "message": "Participant liked successfully!",
        "participant": participant,
    })))
}

/// Draws one participant, weighted by `weight`.
#[tracing::instrument(name = "Draw participant", skip(inner))]
pub async fn draw_participant(State(inner): State<InnerState>) -> Result<Json<Value>, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    let entries = timeout_query(query_timeout, lucky_draw::weights(&db)).await?;
    let winner = {
        let mut rng = rand::thread_rng();
        lucky_draw::pick_weighted(&entries, &mut rng)
    }
    .ok_or_else(|| AppError::NotFound("No participants to draw from".to_string()))?;

    let participant =
        timeout_find(query_timeout, ENTITY, winner, lucky_draw::find_by_id(&db, winner)).await?;
    tracing::info!(id = participant.id, pool = entries.len(), "Lucky draw winner picked");

    Ok(Json(json!({
        "message": "Winner drawn successfully!",
        "participant": participant,
    })))
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::api::common::utils::timeout_query;
use crate::errors::AppError;
use crate::InnerState;

/// Answers `OK` once the database responds to a trivial query.
#[tracing::instrument(name = "Health check", skip(inner))]
pub async fn health_check(State(inner): State<InnerState>) -> Result<impl IntoResponse, AppError> {
    let InnerState { db, query_timeout, .. } = inner;

    timeout_query(
        query_timeout,
        sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(&db),
    )
    .await?;

    Ok((StatusCode::OK, "OK"))
}

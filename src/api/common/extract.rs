//! Request extractors whose rejections go through [`AppError`].

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::AppError;

/// A JSON body that must be an object before it is decoded into `T`.
///
/// serde fills a struct from a JSON array positionally, so `["a", "b"]` would
/// otherwise be read as a request with its first fields set.
#[derive(Debug)]
pub struct JsonObject<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonObject<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        if !value.is_object() {
            return Err(AppError::Validation(
                "Invalid request body: expected a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value)
            .map(JsonObject)
            .map_err(|err| AppError::Validation(format!("Invalid request body: {}", err)))
    }
}

/// The numeric `:id` segment of a resource route.
#[derive(Debug, Clone, Copy)]
pub struct EntityId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(EntityId(id))
    }
}

use crate::errors::AppError;

/// Runs one database future under `duration`, mapping both the timeout and
/// the sqlx error into [`AppError`].
pub async fn timeout_query<T, F>(duration: std::time::Duration, fut: F) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    Ok(tokio::time::timeout(duration, fut).await??)
}

/// Like [`timeout_query`] but turns an absent row into a 404 for `entity`.
pub async fn timeout_find<T, F>(
    duration: std::time::Duration,
    entity: &str,
    id: i64,
    fut: F,
) -> Result<T, AppError>
where
    F: std::future::Future<Output = Result<Option<T>, sqlx::Error>>,
{
    timeout_query(duration, fut)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", entity, id)))
}

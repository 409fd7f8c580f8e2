//! `images` table: photos uploaded for printing.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::api::common::{ListQuery, SortKey, SortOrder};
use crate::db::NOW;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ImageStatus {
    PendingPrint,
    PendingMake,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: i64,
    pub file_path: String,
    pub description: Option<String>,
    pub status: ImageStatus,
    pub likes: i64,
    pub upload_time: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSort {
    UploadTime,
    Likes,
}

impl SortKey for ImageSort {
    const DEFAULT: Self = ImageSort::UploadTime;
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "upload_time" => Some(ImageSort::UploadTime),
            "likes" => Some(ImageSort::Likes),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ImageSort::UploadTime => "upload_time",
            ImageSort::Likes => "likes",
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageChanges {
    pub description: Option<String>,
    pub status: Option<ImageStatus>,
}

pub async fn insert(
    db: &SqlitePool,
    file_path: &str,
    description: Option<&str>,
) -> Result<Image, sqlx::Error> {
    sqlx::query_as::<_, Image>(
        r#"INSERT INTO images (file_path, description) VALUES ($1, $2) RETURNING *"#,
    )
    .bind(file_path)
    .bind(description)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<Image>, sqlx::Error> {
    sqlx::query_as::<_, Image>(r#"SELECT * FROM images WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: &SqlitePool,
    query: &ListQuery<ImageSort>,
) -> Result<Vec<Image>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM images {} LIMIT $1 OFFSET $2",
        query.order_by_clause()
    );
    sqlx::query_as::<_, Image>(&sql)
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
        .fetch_one(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    changes: &ImageChanges,
) -> Result<Option<Image>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE images
           SET description = COALESCE($2, description),
               status = COALESCE($3, status),
               updated_at = {NOW}
           WHERE id = $1
           RETURNING *"#
    );
    sqlx::query_as::<_, Image>(&sql)
        .bind(id)
        .bind(changes.description.as_deref())
        .bind(changes.status)
        .fetch_optional(db)
        .await
}

/// Atomic increment: concurrent likes are never lost.
pub async fn increment_likes(db: &SqlitePool, id: i64) -> Result<Option<Image>, sqlx::Error> {
    let sql = format!(
        "UPDATE images SET likes = likes + 1, updated_at = {NOW} WHERE id = $1 RETURNING *"
    );
    sqlx::query_as::<_, Image>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM images WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn all_paths(db: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT file_path FROM images ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn delete_all(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM images").execute(db).await?;
    Ok(result.rows_affected())
}

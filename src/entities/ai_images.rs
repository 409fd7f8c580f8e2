use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::api::common::{like_pattern, ListQuery, SortKey, SortOrder};
use crate::db::NOW;

/// Default orientation for new AI images (landscape).
pub const DEFAULT_ORIENTATION: i64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiImage {
    pub id: i64,
    pub image_name: String,
    pub image_path: String,
    pub description: Option<String>,
    pub likes: i64,
    pub orientation: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiImageSort {
    UpdatedAt,
    CreatedAt,
    Likes,
}

impl SortKey for AiImageSort {
    const DEFAULT: Self = AiImageSort::UpdatedAt;
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "updated_at" => Some(AiImageSort::UpdatedAt),
            "created_at" => Some(AiImageSort::CreatedAt),
            "likes" => Some(AiImageSort::Likes),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            AiImageSort::UpdatedAt => "updated_at",
            AiImageSort::CreatedAt => "created_at",
            AiImageSort::Likes => "likes",
        }
    }
}

#[derive(Debug)]
pub struct NewAiImage {
    pub image_name: String,
    pub image_path: String,
    pub description: Option<String>,
    pub orientation: i64,
}

#[derive(Debug, Default)]
pub struct AiImageChanges {
    pub image_name: Option<String>,
    pub description: Option<String>,
    pub orientation: Option<i64>,
}

pub async fn insert(db: &SqlitePool, new: &NewAiImage) -> Result<AiImage, sqlx::Error> {
    sqlx::query_as::<_, AiImage>(
        r#"INSERT INTO ai_generated_images (image_name, image_path, description, orientation)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(&new.image_name)
    .bind(&new.image_path)
    .bind(new.description.as_deref())
    .bind(new.orientation)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<AiImage>, sqlx::Error> {
    sqlx::query_as::<_, AiImage>(r#"SELECT * FROM ai_generated_images WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

// A NULL pattern disables the name filter.
const SEARCH_FILTER: &str = r"WHERE ($1 IS NULL OR image_name LIKE $1 ESCAPE '\')";

pub async fn list(
    db: &SqlitePool,
    query: &ListQuery<AiImageSort>,
) -> Result<Vec<AiImage>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM ai_generated_images {SEARCH_FILTER} {} LIMIT $2 OFFSET $3",
        query.order_by_clause()
    );
    sqlx::query_as::<_, AiImage>(&sql)
        .bind(query.search.as_deref().map(like_pattern))
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM ai_generated_images {SEARCH_FILTER}");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(search.map(like_pattern))
        .fetch_one(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    changes: &AiImageChanges,
) -> Result<Option<AiImage>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE ai_generated_images
           SET image_name = COALESCE($2, image_name),
               description = COALESCE($3, description),
               orientation = COALESCE($4, orientation),
               updated_at = {NOW}
           WHERE id = $1
           RETURNING *"#
    );
    sqlx::query_as::<_, AiImage>(&sql)
        .bind(id)
        .bind(changes.image_name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.orientation)
        .fetch_optional(db)
        .await
}

pub async fn increment_likes(db: &SqlitePool, id: i64) -> Result<Option<AiImage>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE ai_generated_images
           SET likes = likes + 1, updated_at = {NOW}
           WHERE id = $1
           RETURNING *"#
    );
    sqlx::query_as::<_, AiImage>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ai_generated_images WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn all_paths(db: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT image_path FROM ai_generated_images ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn delete_all(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM ai_generated_images")
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

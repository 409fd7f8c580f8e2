use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::api::common::{ListQuery, SortKey, SortOrder};
use crate::db::NOW;

pub const DEFAULT_ORIENTATION: i64 = 2;

/// A short "liuma" clip: cover image, optional video and a title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LiumaMedia {
    pub id: i64,
    pub image_url: String,
    pub video_url: Option<String>,
    pub title: String,
    pub orientation: i64,
    pub likes: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiumaMediaSort {
    CreatedAt,
    UpdatedAt,
    Likes,
}

impl SortKey for LiumaMediaSort {
    const DEFAULT: Self = LiumaMediaSort::CreatedAt;
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(LiumaMediaSort::CreatedAt),
            "updated_at" => Some(LiumaMediaSort::UpdatedAt),
            "likes" => Some(LiumaMediaSort::Likes),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            LiumaMediaSort::CreatedAt => "created_at",
            LiumaMediaSort::UpdatedAt => "updated_at",
            LiumaMediaSort::Likes => "likes",
        }
    }
}

#[derive(Debug)]
pub struct NewLiumaMedia {
    pub image_url: String,
    pub video_url: Option<String>,
    pub title: String,
    pub orientation: i64,
}

#[derive(Debug, Default)]
pub struct LiumaMediaChanges {
    pub title: Option<String>,
    pub orientation: Option<i64>,
    pub video_url: Option<String>,
}

pub async fn insert(db: &SqlitePool, new: &NewLiumaMedia) -> Result<LiumaMedia, sqlx::Error> {
    sqlx::query_as::<_, LiumaMedia>(
        r#"INSERT INTO liuma_media (image_url, video_url, title, orientation)
           VALUES ($1, $2, $3, $4)
           RETURNING *"#,
    )
    .bind(&new.image_url)
    .bind(new.video_url.as_deref())
    .bind(&new.title)
    .bind(new.orientation)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<LiumaMedia>, sqlx::Error> {
    sqlx::query_as::<_, LiumaMedia>(r#"SELECT * FROM liuma_media WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: &SqlitePool,
    query: &ListQuery<LiumaMediaSort>,
) -> Result<Vec<LiumaMedia>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM liuma_media {} LIMIT $1 OFFSET $2",
        query.order_by_clause()
    );
    sqlx::query_as::<_, LiumaMedia>(&sql)
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM liuma_media")
        .fetch_one(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    changes: &LiumaMediaChanges,
) -> Result<Option<LiumaMedia>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE liuma_media
           SET title = COALESCE($2, title),
               orientation = COALESCE($3, orientation),
               video_url = COALESCE($4, video_url),
               updated_at = {NOW}
           WHERE id = $1
           RETURNING *"#
    );
    sqlx::query_as::<_, LiumaMedia>(&sql)
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.orientation)
        .bind(changes.video_url.as_deref())
        .fetch_optional(db)
        .await
}

pub async fn increment_likes(db: &SqlitePool, id: i64) -> Result<Option<LiumaMedia>, sqlx::Error> {
    let sql = format!(
        "UPDATE liuma_media SET likes = likes + 1, updated_at = {NOW} WHERE id = $1 RETURNING *"
    );
    sqlx::query_as::<_, LiumaMedia>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM liuma_media WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn all_paths(db: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT image_url FROM liuma_media ORDER BY id")
        .fetch_all(db)
        .await
}

pub async fn delete_all(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM liuma_media").execute(db).await?;
    Ok(result.rows_affected())
}

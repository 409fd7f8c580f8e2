use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::api::common::{ListQuery, SortKey, SortOrder};

/// A guestbook entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSort {
    CreatedAt,
    Id,
}

impl SortKey for MessageSort {
    const DEFAULT: Self = MessageSort::CreatedAt;
    const DEFAULT_ORDER: SortOrder = SortOrder::Desc;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(MessageSort::CreatedAt),
            "id" => Some(MessageSort::Id),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            MessageSort::CreatedAt => "created_at",
            MessageSort::Id => "id",
        }
    }
}

pub async fn insert(db: &SqlitePool, name: &str, content: &str) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"INSERT INTO messages (name, content) VALUES ($1, $2) RETURNING *"#,
    )
    .bind(name)
    .bind(content)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(r#"SELECT * FROM messages WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: &SqlitePool,
    query: &ListQuery<MessageSort>,
) -> Result<Vec<Message>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM messages {} LIMIT $1 OFFSET $2",
        query.order_by_clause()
    );
    sqlx::query_as::<_, Message>(&sql)
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages")
        .fetch_one(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    name: Option<&str>,
    content: Option<&str>,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"UPDATE messages
           SET name = COALESCE($2, name),
               content = COALESCE($3, content)
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(name)
    .bind(content)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages").execute(db).await?;
    Ok(result.rows_affected())
}

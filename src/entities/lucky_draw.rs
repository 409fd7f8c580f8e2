//! `lucky_draw` table: participants of a weighted raffle.

use chrono::NaiveDateTime;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::api::common::{ListQuery, SortKey, SortOrder};
use crate::db::NOW;

pub const DEFAULT_WEIGHT: i64 = 1;
pub const MAX_WEIGHT: i64 = 1_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Participant {
    pub id: i64,
    pub name: String,
    pub weight: i64,
    pub likes: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantSort {
    Id,
    Weight,
    CreatedAt,
    Likes,
}

impl SortKey for ParticipantSort {
    const DEFAULT: Self = ParticipantSort::Id;
    const DEFAULT_ORDER: SortOrder = SortOrder::Asc;

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(ParticipantSort::Id),
            "weight" => Some(ParticipantSort::Weight),
            "created_at" => Some(ParticipantSort::CreatedAt),
            "likes" => Some(ParticipantSort::Likes),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ParticipantSort::Id => "id",
            ParticipantSort::Weight => "weight",
            ParticipantSort::CreatedAt => "created_at",
            ParticipantSort::Likes => "likes",
        }
    }
}

pub async fn insert(db: &SqlitePool, name: &str, weight: i64) -> Result<Participant, sqlx::Error> {
    sqlx::query_as::<_, Participant>(
        r#"INSERT INTO lucky_draw (name, weight) VALUES ($1, $2) RETURNING *"#,
    )
    .bind(name)
    .bind(weight)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<Participant>, sqlx::Error> {
    sqlx::query_as::<_, Participant>(r#"SELECT * FROM lucky_draw WHERE id = $1"#)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn list(
    db: &SqlitePool,
    query: &ListQuery<ParticipantSort>,
) -> Result<Vec<Participant>, sqlx::Error> {
    let sql = format!(
        "SELECT * FROM lucky_draw {} LIMIT $1 OFFSET $2",
        query.order_by_clause()
    );
    sqlx::query_as::<_, Participant>(&sql)
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(db)
        .await
}

pub async fn count(db: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lucky_draw")
        .fetch_one(db)
        .await
}

pub async fn update(
    db: &SqlitePool,
    id: i64,
    name: Option<&str>,
    weight: Option<i64>,
) -> Result<Option<Participant>, sqlx::Error> {
    let sql = format!(
        r#"UPDATE lucky_draw
           SET name = COALESCE($2, name),
               weight = COALESCE($3, weight),
               updated_at = {NOW}
           WHERE id = $1
           RETURNING *"#
    );
    sqlx::query_as::<_, Participant>(&sql)
        .bind(id)
        .bind(name)
        .bind(weight)
        .fetch_optional(db)
        .await
}

pub async fn increment_likes(db: &SqlitePool, id: i64) -> Result<Option<Participant>, sqlx::Error> {
    let sql = format!(
        "UPDATE lucky_draw SET likes = likes + 1, updated_at = {NOW} WHERE id = $1 RETURNING *"
    );
    sqlx::query_as::<_, Participant>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lucky_draw WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(db: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lucky_draw").execute(db).await?;
    Ok(result.rows_affected())
}

/// `(id, weight)` of every participant, the input of a draw.
pub async fn weights(db: &SqlitePool) -> Result<Vec<(i64, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>("SELECT id, weight FROM lucky_draw ORDER BY id")
        .fetch_all(db)
        .await
}

/// Picks one id with probability proportional to its weight.
///
/// Returns `None` when there is nothing to draw from, or when the weights do
/// not fit in a `u64` sum. Non-positive weights never win.
pub fn pick_weighted<R: Rng + ?Sized>(entries: &[(i64, i64)], rng: &mut R) -> Option<i64> {
    let weights: Vec<u64> = entries
        .iter()
        .map(|(_, weight)| (*weight).max(0) as u64)
        .collect();
    // WeightedIndex panics if the running total overflows.
    weights.iter().try_fold(0u64, |total, w| total.checked_add(*w))?;
    let index = WeightedIndex::new(weights).ok()?;
    entries.get(index.sample(rng)).map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_list_has_no_winner() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(pick_weighted(&[], &mut rng), None);
    }

    #[test]
    fn only_positive_weights_can_win() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(pick_weighted(&[(1, 0), (2, 5)], &mut rng), Some(2));
        }
    }

    #[test]
    fn overflowing_weights_draw_nobody() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = [(1, i64::MAX), (2, i64::MAX), (3, i64::MAX)];
        assert_eq!(pick_weighted(&entries, &mut rng), None);
    }

    #[test]
    fn capped_weights_never_overflow() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries: Vec<(i64, i64)> = (1..=1000).map(|id| (id, MAX_WEIGHT)).collect();
        assert!(pick_weighted(&entries, &mut rng).is_some());
    }

    #[test]
    fn heavier_participants_win_more_often() {
        let mut rng = StdRng::seed_from_u64(42);
        let entries = [(1, 1), (2, 9)];
        let heavy_wins = (0..2000)
            .filter(|_| pick_weighted(&entries, &mut rng) == Some(2))
            .count();
        assert!(heavy_wins > 1500, "heavy participant won {heavy_wins} of 2000");
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::rating::{RatingRow, TopicRating};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Rating store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    /// No connection could be had at all; the query itself never ran.
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Persistence seam for per-user topic ratings.
///
/// Carried in `AppState` as `Arc<dyn RatingStore>` through the skill engine.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Merges a batch keyed on `(user_id, topic)`, overwriting existing rows
    /// whole. The batch applies atomically; returns the number of rows written.
    async fn upsert_ratings(&self, rows: &[RatingRow]) -> Result<usize, StoreError>;

    async fn list_ratings(&self, user_id: Uuid) -> Result<Vec<TopicRating>, StoreError>;
}

/// Postgres-backed store over the `user_ratings` table.
#[derive(Clone)]
pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingStore for PgRatingStore {
    async fn upsert_ratings(&self, rows: &[RatingRow]) -> Result<usize, StoreError> {
        let mut user_ids = Vec::with_capacity(rows.len());
        let mut topics = Vec::with_capacity(rows.len());
        let mut ratings = Vec::with_capacity(rows.len());
        let mut confidences = Vec::with_capacity(rows.len());
        for row in rows {
            user_ids.push(row.user_id);
            topics.push(row.topic.clone());
            ratings.push(row.rating);
            confidences.push(row.confidence);
        }

        // One statement, so the whole batch commits or none of it does.
        let result = sqlx::query(
            r#"
            INSERT INTO user_ratings (user_id, topic, rating, confidence)
            SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::smallint[], $4::float8[])
            ON CONFLICT (user_id, topic) DO UPDATE
            SET rating = EXCLUDED.rating,
                confidence = EXCLUDED.confidence
            "#,
        )
        .bind(user_ids)
        .bind(topics)
        .bind(ratings)
        .bind(confidences)
        .execute(&self.pool)
        .await?;

        debug!("Upserted {} rating rows", result.rows_affected());
        Ok(result.rows_affected() as usize)
    }

    async fn list_ratings(&self, user_id: Uuid) -> Result<Vec<TopicRating>, StoreError> {
        Ok(sqlx::query_as::<_, TopicRating>(
            "SELECT topic, rating, confidence FROM user_ratings WHERE user_id = $1 ORDER BY topic",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

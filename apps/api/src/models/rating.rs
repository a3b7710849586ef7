use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored rating as read back from `user_ratings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TopicRating {
    pub topic: String,
    pub rating: i16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// A normalized row ready to be merged into `user_ratings`.
/// `topic` is canonical, `rating` is in `[0, 5]`, `confidence` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRow {
    pub user_id: Uuid,
    pub topic: String,
    pub rating: i16,
    pub confidence: Option<f64>,
}

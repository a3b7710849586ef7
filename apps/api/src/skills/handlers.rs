use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::rating::TopicRating;
use crate::skills::{ExecutedAction, MentorAction};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ActionRequest {
    pub user_id: Uuid,
    /// Parsed leniently; anything unrecognisable executes as `none`.
    #[serde(default)]
    pub action: Value,
}

/// POST /api/v1/skills/actions
pub async fn handle_execute_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ExecutedAction>, AppError> {
    let action = MentorAction::from_value(request.action);
    let executed = state.skills.execute_action(request.user_id, action).await?;
    Ok(Json(executed))
}

/// GET /api/v1/ratings
pub async fn handle_list_ratings(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<TopicRating>>, AppError> {
    let ratings = state.skills.ratings_for(params.user_id).await?;
    Ok(Json(ratings))
}

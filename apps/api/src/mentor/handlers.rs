use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::mentor::{mentor_turn, ChatMessage, MentorError, MentorProject, MentorReply};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MentorRequest {
    pub user_id: Uuid,
    pub project: Option<MentorProject>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// POST /api/v1/mentor
///
/// Failures after validation degrade to a generic "continue" reply so the
/// conversation UI always has something to render. An empty model reply is
/// the exception and surfaces as 502.
pub async fn handle_mentor(
    State(state): State<AppState>,
    Json(request): Json<MentorRequest>,
) -> Result<Json<MentorReply>, AppError> {
    let project = match request.project {
        Some(project) if !request.messages.is_empty() => project,
        _ => return Err(AppError::Validation("Missing project/messages".to_string())),
    };

    match mentor_turn(
        &state.llm,
        &state.skills,
        request.user_id,
        &project,
        &request.messages,
    )
    .await
    {
        Ok(reply) => Ok(Json(reply)),
        Err(MentorError::Llm(LlmError::EmptyContent)) => {
            Err(AppError::BadGateway("Empty model response".to_string()))
        }
        Err(e) => {
            error!("Mentor turn failed for user {}: {e}", request.user_id);
            Ok(Json(MentorReply::fallback()))
        }
    }
}

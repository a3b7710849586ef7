use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, HeaderValue},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::credits::spend_ip_credit;
use crate::errors::AppError;
use crate::generate::{generate_or_fallback, ProjectBrief, ProjectInterests};
use crate::state::AppState;

pub const SOURCE_HEADER: &str = "x-vector-project-source";
pub const ERROR_HEADER: &str = "x-vector-project-error";
pub const CREDITS_HEADER: &str = "x-vector-credits-remaining";

#[derive(Debug, Deserialize)]
pub struct GenerateProjectRequest {
    #[serde(default)]
    pub interests: Value,
    #[serde(default)]
    pub tags: Value,
}

/// POST /api/v1/projects/generate
///
/// Spends one credit of the caller's IP, then generates a brief. The brief is
/// always returned on 200; `x-vector-project-source` says whether it came
/// from the model or is the sample fallback.
pub async fn handle_generate_project(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<GenerateProjectRequest>,
) -> Result<(HeaderMap, Json<ProjectBrief>), AppError> {
    let input = ProjectInterests::from_values(&request.interests, &request.tags);
    if input.is_empty() {
        return Err(AppError::Validation(
            "Provide interests or tags to generate a project".to_string(),
        ));
    }

    // Visitors are metered by address; without one there is nothing to spend.
    let Some(ConnectInfo(addr)) = connect_info else {
        return Err(AppError::InsufficientCredits);
    };
    let ip = addr.ip().to_string();

    let Some(remaining) = spend_ip_credit(&state.db, &ip, state.config.ip_initial_credits).await?
    else {
        info!("Generation refused for {ip}: no credits left");
        return Err(AppError::InsufficientCredits);
    };

    let generated = generate_or_fallback(&state.llm, &input).await;

    let mut headers = HeaderMap::new();
    headers.insert(
        SOURCE_HEADER,
        HeaderValue::from_static(generated.source.as_str()),
    );
    headers.insert(CREDITS_HEADER, HeaderValue::from(remaining));
    if let Some(message) = generated.error.as_deref() {
        if let Ok(value) = HeaderValue::from_str(&header_safe(message)) {
            headers.insert(ERROR_HEADER, value);
        }
    }

    Ok((headers, Json(generated.brief)))
}

/// Header values must be visible ASCII.
fn header_safe(message: &str) -> String {
    message
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '?' })
        .collect()
}

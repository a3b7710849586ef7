use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::skills::SkillEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub config: Config,
    /// Skill engine over a pluggable `RatingStore`. Default: `PgRatingStore` on `db`.
    pub skills: Arc<SkillEngine>,
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::credits::handlers as credits;
use crate::generate::handlers as generate;
use crate::mentor::handlers as mentor;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skill engine
        .route("/api/v1/skills/actions", post(skills::handle_execute_action))
        .route("/api/v1/ratings", get(skills::handle_list_ratings))
        // Mentor chat
        .route("/api/v1/mentor", post(mentor::handle_mentor))
        // Credits
        .route("/api/v1/credits", get(credits::handle_get_credits))
        .route(
            "/api/v1/credits/consume",
            post(credits::handle_consume_credit),
        )
        // Project generation
        .route(
            "/api/v1/projects/generate",
            post(generate::handle_generate_project),
        )
        .with_state(state)
}

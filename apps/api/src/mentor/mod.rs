//! Mentor turns: one LLM exchange per learner message, with the reply's
//! action executed through the skill engine.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::llm_client::{JsonSchemaFormat, LlmClient, LlmError};
use crate::mentor::prompts::{
    mentor_instructions, mentor_schema, MENTOR_SCHEMA_NAME, RATINGS_GUIDANCE,
};
use crate::models::rating::TopicRating;
use crate::skills::{MentorAction, SkillEngine, StoreError};

const FALLBACK_TITLE: &str = "Continue";
const FALLBACK_CONTENT: &str = "Something went wrong. Tell me your next question about the task.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorProject {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"mentor"` or `"user"`; anything else is rendered as the user.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentorReply {
    pub title: String,
    pub content: String,
    pub action: MentorAction,
}

impl MentorReply {
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            content: FALLBACK_CONTENT.to_string(),
            action: MentorAction::None { note: None },
        }
    }
}

#[derive(Debug, Error)]
pub enum MentorError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct ModelMessage {
    title: String,
    content: String,
    #[serde(default)]
    action: Value,
}

/// Runs one mentor turn for `user_id`.
///
/// The learner's current ratings are folded into the prompt when they can be
/// read; an unreadable rating table only costs that context.
pub async fn mentor_turn(
    llm: &LlmClient,
    skills: &SkillEngine,
    user_id: Uuid,
    project: &MentorProject,
    messages: &[ChatMessage],
) -> Result<MentorReply, MentorError> {
    let ratings = match skills.ratings_for(user_id).await {
        Ok(ratings) => ratings,
        Err(e) => {
            warn!("Could not load ratings for user {user_id}: {e}");
            Vec::new()
        }
    };

    let input = build_prompt(project, &ratings, messages);
    let format = JsonSchemaFormat::strict(MENTOR_SCHEMA_NAME, mentor_schema());
    let reply: ModelMessage = llm
        .call_json(&mentor_instructions(), &input, &format)
        .await?;

    let action = MentorAction::from_value(reply.action).narrowed();
    let executed = skills.execute_action(user_id, action).await?;

    Ok(MentorReply {
        title: reply.title,
        content: reply.content,
        action: executed.action,
    })
}

pub fn build_prompt(
    project: &MentorProject,
    ratings: &[TopicRating],
    messages: &[ChatMessage],
) -> String {
    let ratings_json = serde_json::to_string(ratings).unwrap_or_else(|_| "[]".to_string());

    let mut lines = vec![
        format!("Project: {}", project.title),
        project.description.clone(),
    ];
    if !project.skills.is_empty() {
        lines.push(format!("Skills: {}", project.skills.join(", ")));
    }
    lines.push(format!("Use the user's current skill ratings: {ratings_json}"));
    lines.push(RATINGS_GUIDANCE.to_string());
    lines.push(String::new());
    lines.push("Conversation:".to_string());
    for message in messages {
        let speaker = if message.role == "mentor" { "Mentor" } else { "User" };
        lines.push(format!("{speaker}: {}", message.content));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::skills::memory::MemoryRatingStore;
    use crate::skills::TopicCanonicalizer;

    fn project() -> MentorProject {
        MentorProject {
            title: "Snake".into(),
            description: "A tiny pygame snake clone".into(),
            skills: vec!["pygame".into(), "loops".into()],
        }
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "mentor".into(),
                content: "Have you set up a venv?".into(),
            },
            ChatMessage {
                role: "user".into(),
                content: "Yes, and pip installed pygame.".into(),
            },
        ]
    }

    fn model_reply(message: Value) -> Value {
        json!({
            "output": [{
                "type": "message",
                "content": [{ "type": "output_text", "text": message.to_string() }]
            }]
        })
    }

    async fn llm_returning(body: Value) -> (MockServer, LlmClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let client = LlmClient::with_base_url("sk-test".into(), &server.uri());
        (server, client)
    }

    #[test]
    fn test_build_prompt_layout() {
        let ratings = vec![TopicRating {
            topic: "py.env.venv".into(),
            rating: 3,
            confidence: Some(0.5),
        }];
        let prompt = build_prompt(&project(), &ratings, &messages());
        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(lines[0], "Project: Snake");
        assert_eq!(lines[1], "A tiny pygame snake clone");
        assert_eq!(lines[2], "Skills: pygame, loops");
        assert_eq!(
            lines[3],
            r#"Use the user's current skill ratings: [{"topic":"py.env.venv","rating":3,"confidence":0.5}]"#
        );
        assert!(prompt.ends_with(
            "Conversation:\nMentor: Have you set up a venv?\nUser: Yes, and pip installed pygame."
        ));
    }

    #[test]
    fn test_build_prompt_omits_empty_skills() {
        let mut p = project();
        p.skills.clear();
        let prompt = build_prompt(&p, &[], &messages());
        assert!(!prompt.contains("Skills:"));
        assert!(prompt.contains("Use the user's current skill ratings: []"));
    }

    #[test]
    fn test_fallback_reply_shape() {
        assert_eq!(
            serde_json::to_value(MentorReply::fallback()).unwrap(),
            json!({
                "title": "Continue",
                "content": "Something went wrong. Tell me your next question about the task.",
                "action": { "type": "none" }
            })
        );
    }

    #[tokio::test]
    async fn test_turn_executes_rating_update() {
        let (_server, llm) = llm_returning(model_reply(json!({
            "title": "Nice",
            "content": "Next, open a window.",
            "action": {
                "type": "update_ratings",
                "note": "",
                "topics": [],
                "ratings": [{ "topic": "venv", "rating": 4, "confidence": 0.9 }]
            }
        })))
        .await;
        let store = Arc::new(MemoryRatingStore::default());
        let engine = SkillEngine::new(store.clone(), TopicCanonicalizer::default());
        let uid = Uuid::new_v4();

        let reply = mentor_turn(&llm, &engine, uid, &project(), &messages())
            .await
            .unwrap();

        assert_eq!(reply.title, "Nice");
        assert_eq!(reply.action.kind(), "update_ratings");
        let stored = engine.ratings_for(uid).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].topic, "py.env.venv");
        assert_eq!(stored[0].rating, 4);
    }

    #[tokio::test]
    async fn test_turn_narrows_empty_assessment() {
        let (_server, llm) = llm_returning(model_reply(json!({
            "title": "Question",
            "content": "What does a game loop do?",
            "action": { "type": "assess_skills", "note": "quiz", "topics": [], "ratings": [] }
        })))
        .await;
        let store = Arc::new(MemoryRatingStore::default());
        let engine = SkillEngine::new(store.clone(), TopicCanonicalizer::default());

        let reply = mentor_turn(&llm, &engine, Uuid::new_v4(), &project(), &messages())
            .await
            .unwrap();

        assert_eq!(reply.action, MentorAction::None { note: None });
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_turn_surfaces_storage_failure() {
        let (_server, llm) = llm_returning(model_reply(json!({
            "title": "Nice",
            "content": "Keep going.",
            "action": {
                "type": "update_ratings",
                "note": "",
                "topics": [],
                "ratings": [{ "topic": "pip", "rating": 2, "confidence": 0.4 }]
            }
        })))
        .await;
        let engine = SkillEngine::new(
            Arc::new(MemoryRatingStore::failing()),
            TopicCanonicalizer::default(),
        );

        let result = mentor_turn(&llm, &engine, Uuid::new_v4(), &project(), &messages()).await;
        assert!(matches!(result, Err(MentorError::Store(_))));
    }
}

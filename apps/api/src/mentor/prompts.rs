use serde_json::{json, Value};

use crate::llm_client::prompts::{JSON_SCHEMA_OUTPUT, NO_CODE_DUMPS};

pub const MENTOR_SCHEMA_NAME: &str = "mentor_message";

/// Structured-output schema for one mentor turn.
///
/// Strict mode allows neither `oneOf` nor conditional requirements, so the
/// action is a single object with every field required; the skill engine
/// narrows it afterwards.
pub fn mentor_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["title", "content", "action"],
        "properties": {
            "title": { "type": "string", "minLength": 1, "maxLength": 80 },
            "content": { "type": "string", "minLength": 1, "maxLength": 600 },
            "action": {
                "type": "object",
                "additionalProperties": false,
                "required": ["type", "note", "topics", "ratings"],
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["none", "assess_skills", "update_ratings", "recommend_skills"]
                    },
                    "note": { "type": "string" },
                    "topics": {
                        "type": "array",
                        "minItems": 1,
                        "items": { "type": "string", "minLength": 1, "maxLength": 64 }
                    },
                    "ratings": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["topic", "rating", "confidence"],
                            "properties": {
                                "topic": { "type": "string", "minLength": 1, "maxLength": 64 },
                                "rating": { "type": "number", "minimum": 0, "maximum": 5 },
                                "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                            }
                        }
                    }
                }
            }
        }
    })
}

pub fn mentor_instructions() -> String {
    [
        "You are the Mentor for a small Python game project on a learning platform.",
        "NORTH STAR: guide the learner to finish the project end-to-end.",
        "ADAPTIVITY: diagnose their current skill; if a prerequisite is missing, teach it first.",
        "PACE: one precise next step at a time; keep replies short and focused.",
        "FORMAT: reference files, functions, modules, and checks, not code dumps.",
        NO_CODE_DUMPS,
        "ASSESS/UPDATE SKILLS:",
        "- When you probe knowledge, set action: { type: \"assess_skills\", topics: [...] }.",
        "- When skill is demonstrated/learned, set action: { type: \"update_ratings\", ratings: [{ topic, rating, confidence }] }.",
        "- You may recommend topics with { type: \"recommend_skills\", topics: [...] }.",
        JSON_SCHEMA_OUTPUT,
    ]
    .join("\n")
}

pub const RATINGS_GUIDANCE: &str = "Adjust your pace and material that you cover to help the user fill skills that are lacking and complete the project";

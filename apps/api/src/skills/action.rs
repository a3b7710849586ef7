//! Mentor actions: the closed set of instructions the conversation layer may
//! hand to the skill engine, plus the shapes the engine answers with.
//!
//! Deserialization never fails for a JSON object. Missing lists default to
//! empty, loosely-typed fields are coerced, and an unrecognised `type`
//! becomes [`MentorAction::Unknown`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One proposed rating as emitted by the mentor, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingProposal {
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", from = "RawMentorAction")]
pub enum MentorAction {
    None {
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    AssessSkills {
        topics: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    UpdateRatings {
        ratings: Vec<RatingProposal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    RecommendSkills {
        topics: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Any discriminant outside the known set. Serializes as `none`.
    #[serde(rename = "none")]
    Unknown {
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl MentorAction {
    /// Parses an arbitrary JSON value. Non-objects collapse to `Unknown`.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(MentorAction::Unknown { note: None })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MentorAction::None { .. } => "none",
            MentorAction::AssessSkills { .. } => "assess_skills",
            MentorAction::UpdateRatings { .. } => "update_ratings",
            MentorAction::RecommendSkills { .. } => "recommend_skills",
            MentorAction::Unknown { .. } => "unknown",
        }
    }

    /// Stricter gate applied to model output before execution: an action
    /// whose payload list is empty carries nothing to act on and becomes a
    /// plain `none`.
    pub fn narrowed(self) -> Self {
        match self {
            MentorAction::AssessSkills { ref topics, .. }
            | MentorAction::RecommendSkills { ref topics, .. }
                if topics.is_empty() =>
            {
                MentorAction::None { note: None }
            }
            MentorAction::UpdateRatings { ref ratings, .. } if ratings.is_empty() => {
                MentorAction::None { note: None }
            }
            MentorAction::Unknown { note } => MentorAction::None { note },
            other => other,
        }
    }
}

/// What the engine did with an action. Serialized without a tag; the keys
/// alone identify the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionResult {
    Updated { updated_count: usize },
    Requested { requested: Vec<String> },
    Recommended { recommended: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedAction {
    pub action: MentorAction,
    pub result: Option<ActionResult>,
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient wire shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawMentorAction {
    #[serde(rename = "type", default)]
    kind: Value,
    #[serde(default)]
    note: Value,
    #[serde(default)]
    topics: Value,
    #[serde(default)]
    ratings: Value,
}

impl From<RawMentorAction> for MentorAction {
    fn from(raw: RawMentorAction) -> Self {
        let note = raw.note.as_str().map(String::from);
        match raw.kind.as_str() {
            Some("none") => MentorAction::None { note },
            Some("assess_skills") => MentorAction::AssessSkills {
                topics: topic_list(raw.topics),
                note,
            },
            Some("update_ratings") => MentorAction::UpdateRatings {
                ratings: rating_list(raw.ratings),
                note,
            },
            Some("recommend_skills") => MentorAction::RecommendSkills {
                topics: topic_list(raw.topics),
                note,
            },
            _ => MentorAction::Unknown { note },
        }
    }
}

fn topic_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.into_iter().map(stringify).collect(),
        _ => Vec::new(),
    }
}

fn rating_list(value: Value) -> Vec<RatingProposal> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(proposal_from_object(obj)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn proposal_from_object(mut obj: Map<String, Value>) -> RatingProposal {
    RatingProposal {
        topic: stringify(obj.remove("topic").unwrap_or(Value::Null)),
        rating: obj.get("rating").and_then(loose_number),
        confidence: obj.get("confidence").and_then(loose_number),
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accepts JSON numbers and numeric strings; everything else is absent.
fn loose_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

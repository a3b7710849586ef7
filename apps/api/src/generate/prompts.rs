// Prompt constants for project generation.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::{json, Value};

use crate::llm_client::prompts::JSON_SCHEMA_OUTPUT;

pub const PROJECT_SCHEMA_NAME: &str = "project_brief";

/// System prompt for project generation.
pub const GENERATE_SYSTEM: &str =
    "You are an expert career mentor generating project briefs. Always respond with valid JSON.";

/// The milestone names every brief must use, in order.
pub const MILESTONE_NAMES: [&str; 5] = [
    "Introduction",
    "Setup",
    "Core Feature",
    "Measure & Optimize",
    "Conclusion",
];

pub const GENERATE_GUIDANCE: &str = "Generate ONE standout technical project tailored to the candidate. \
    Scope: a single feature, deliverable as a minimal working demo, with no multi-part or stretch goals. \
    Fit: the learner can complete it in one week. \
    Quality bars: concrete deliverables, measurable outcomes, realistic tools and datasets.";

/// Brief rules, one per line. Rendered as a bullet list after the guidance.
pub const GENERATE_RULES: &[&str] = &[
    "Title: at most 4 words, descriptive technical terms only.",
    "Difficulty: one of Easy, Medium, Hard, Expert.",
    "Timeline: a short estimate like \"1-2 weeks\" (weeks or months only).",
    "Description: a 3-5 sentence high level overview that does NOT mention timeframes or duration.",
    "Jobs: 1-6 realistic job titles, with best-guess URLs when unknown.",
    "Skills: 3 atomic skills of 1-5 words each; at least one names the tech stack (e.g. \"Python\"). No vague tokens such as basics or fundamentals.",
    "Prerequisites: 3 prerequisite skills in the same atomic style (e.g. \"Matrix Multiplication\").",
    "Milestones: EXACTLY 5, in this order and with these names: Introduction; Setup; Core Feature; Measure & Optimize; Conclusion.",
    "Each milestone has an objective of at most one sentence and 2-3 observable, testable success_metrics.",
    "Introduction checks the prerequisites and teaches any that are missing before moving on.",
    "Setup covers toolchain, repository and libraries, then gives a high level overview of what will be built.",
    "Core Feature implements the single feature end-to-end.",
    "Measure & Optimize instruments ONE metric, applies ONE optimization, and reports before/after.",
    "Conclusion summarizes the skills learned with a results sentence: \"Increased <metric> by <Y>% via <Z>\".",
    JSON_SCHEMA_OUTPUT,
];

/// Structured-output schema for a project brief.
pub fn project_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "title", "difficulty", "timeline", "description",
            "jobs", "skills", "prerequisites", "metadata"
        ],
        "properties": {
            "title": {
                "type": "string",
                "minLength": 4,
                "maxLength": 64,
                "pattern": "^[A-Za-z0-9+\\-]+(?:\\s+[A-Za-z0-9+\\-]+){0,3}$"
            },
            "difficulty": { "type": "string", "enum": ["Easy", "Medium", "Hard", "Expert"] },
            "timeline": {
                "type": "string",
                "minLength": 3,
                "maxLength": 24,
                "pattern": "^[0-9]+(?:-[0-9]+)?\\s?(?:week|weeks|month|months)$"
            },
            "description": { "type": "string", "minLength": 30 },
            "jobs": {
                "type": "array",
                "minItems": 1,
                "maxItems": 6,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["title", "url"],
                    "properties": {
                        "title": { "type": "string", "minLength": 5 },
                        "url": { "type": "string", "minLength": 6 }
                    }
                }
            },
            "skills": skill_list(40),
            "prerequisites": skill_list(80),
            "metadata": {
                "type": "object",
                "additionalProperties": false,
                "required": ["milestones"],
                "properties": {
                    "milestones": {
                        "type": "array",
                        "minItems": 3,
                        "maxItems": 6,
                        "items": {
                            "type": "object",
                            "additionalProperties": false,
                            "required": ["name", "objective", "success_metrics"],
                            "properties": {
                                "name": { "type": "string", "minLength": 3, "maxLength": 80 },
                                "objective": { "type": "string", "minLength": 12, "maxLength": 240 },
                                "success_metrics": {
                                    "type": "array",
                                    "minItems": 2,
                                    "maxItems": 3,
                                    "items": { "type": "string", "minLength": 8, "maxLength": 160 }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn skill_list(max_len: u32) -> Value {
    json!({
        "type": "array",
        "minItems": 3,
        "maxItems": 12,
        "items": { "type": "string", "minLength": 2, "maxLength": max_len }
    })
}

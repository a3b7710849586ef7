//! Project generation: turns a learner's interests into one project brief.
//!
//! Every request spends one generation credit before the model is called.
//! A model failure still yields a brief: the built-in sample project, marked
//! as a fallback so the client can tell the two apart.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::generate::prompts::{
    project_schema, GENERATE_GUIDANCE, GENERATE_RULES, GENERATE_SYSTEM, MILESTONE_NAMES,
    PROJECT_SCHEMA_NAME,
};
use crate::llm_client::{JsonSchemaFormat, LlmClient, LlmError};

const MIN_MILESTONES: usize = 3;
const MAX_MILESTONES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub name: String,
    pub objective: String,
    pub success_metrics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefMetadata {
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectBrief {
    pub title: String,
    pub difficulty: Difficulty,
    pub timeline: String,
    pub description: String,
    pub jobs: Vec<JobLink>,
    pub skills: Vec<String>,
    pub prerequisites: Vec<String>,
    pub metadata: BriefMetadata,
}

impl ProjectBrief {
    /// Structural checks the schema cannot guarantee once a model drifts.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("brief has an empty title".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("brief has an empty description".to_string());
        }
        if self.jobs.is_empty() || self.skills.is_empty() {
            return Err("brief lists no jobs or no skills".to_string());
        }
        let count = self.metadata.milestones.len();
        if !(MIN_MILESTONES..=MAX_MILESTONES).contains(&count) {
            return Err(format!(
                "brief has {count} milestones, expected {MIN_MILESTONES}-{MAX_MILESTONES}"
            ));
        }
        Ok(())
    }

    /// The project served when generation fails.
    pub fn sample() -> Self {
        let objectives = [
            "Confirm the learner is comfortable with loops, functions and lists in Python.",
            "Create a virtual environment, install pygame and open an empty game window.",
            "Build a playable snake that moves, grows on food and ends on collision.",
            "Measure the frame rate and keep it steady by limiting redraws to changed cells.",
            "Summarize the skills practised and report the frame rate improvement achieved.",
        ];
        let metrics = [
            ["Explains what a for loop does", "Writes a function that returns a value"],
            ["Virtual environment activates cleanly", "A blank pygame window opens and closes"],
            ["Snake grows after eating food", "Game ends when the snake hits a wall"],
            ["Frame rate is printed every second", "Frame rate stays at or above 60 FPS"],
            ["Lists three skills learned in the project", "States the measured frame rate change"],
        ];
        let milestones = MILESTONE_NAMES
            .iter()
            .zip(objectives)
            .zip(metrics)
            .map(|((name, objective), metrics)| Milestone {
                name: name.to_string(),
                objective: objective.to_string(),
                success_metrics: metrics.iter().map(|m| m.to_string()).collect(),
            })
            .collect();

        Self {
            title: "Pygame Snake Game".to_string(),
            difficulty: Difficulty::Easy,
            timeline: "1 week".to_string(),
            description: "Build a classic snake game in Python with pygame. The snake moves on a \
                grid, grows when it eats food and ends the round when it collides with a wall or \
                itself. The project covers a game loop, keyboard input and simple rendering."
                .to_string(),
            jobs: vec![JobLink {
                title: "Junior Python Developer".to_string(),
                url: "https://www.linkedin.com/jobs/search/?keywords=junior%20python%20developer"
                    .to_string(),
            }],
            skills: vec!["Python".into(), "Game Loops".into(), "Event Handling".into()],
            prerequisites: vec!["Python Functions".into(), "Lists".into(), "Loops".into()],
            metadata: BriefMetadata { milestones },
        }
    }
}

/// What the learner asked for. At least one of the two must be non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectInterests {
    pub interests: String,
    pub tags: Vec<String>,
}

impl ProjectInterests {
    /// Non-string `interests` read as empty; non-string tags and blank tags are dropped.
    pub fn from_values(interests: &Value, tags: &Value) -> Self {
        let tags = match tags {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .map(String::from)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            interests: interests.as_str().unwrap_or_default().trim().to_string(),
            tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.interests.is_empty() && self.tags.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSource {
    Generated,
    Fallback,
}

impl ProjectSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectSource::Generated => "generated",
            ProjectSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub brief: ProjectBrief,
    pub source: ProjectSource,
    /// Why generation fell back, when it did.
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Model response did not match the project brief: {0}")]
    InvalidBrief(String),
}

pub fn build_prompt(input: &ProjectInterests) -> String {
    let mut sections = vec![GENERATE_GUIDANCE.to_string()];
    if !input.interests.is_empty() {
        sections.push(format!("Primary interests or goals:\n{}", input.interests));
    }
    if !input.tags.is_empty() {
        let tags: Vec<String> = input.tags.iter().map(|t| format!("- {t}")).collect();
        sections.push(format!("Key focus tags:\n{}", tags.join("\n")));
    }
    let rules: Vec<String> = GENERATE_RULES.iter().map(|r| format!("- {r}")).collect();
    sections.push(format!("Follow these additional rules:\n{}", rules.join("\n")));
    sections.join("\n\n")
}

pub async fn generate_project(
    llm: &LlmClient,
    input: &ProjectInterests,
) -> Result<ProjectBrief, GenerateError> {
    let format = JsonSchemaFormat::strict(PROJECT_SCHEMA_NAME, project_schema());
    let brief: ProjectBrief = llm
        .call_json(GENERATE_SYSTEM, &build_prompt(input), &format)
        .await?;
    brief.validate().map_err(GenerateError::InvalidBrief)?;
    Ok(brief)
}

/// Like [`generate_project`], but never fails: errors fall back to
/// [`ProjectBrief::sample`].
pub async fn generate_or_fallback(llm: &LlmClient, input: &ProjectInterests) -> GeneratedProject {
    match generate_project(llm, input).await {
        Ok(brief) => {
            info!("Generated project brief '{}'", brief.title);
            GeneratedProject {
                brief,
                source: ProjectSource::Generated,
                error: None,
            }
        }
        Err(e) => {
            warn!("Project generation failed, serving the sample project: {e}");
            GeneratedProject {
                brief: ProjectBrief::sample(),
                source: ProjectSource::Fallback,
                error: Some(e.to_string()),
            }
        }
    }
}

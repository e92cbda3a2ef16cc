// src/protocol/mod.rs

pub mod extractor;
pub mod localizer;
pub mod planner;
pub mod prompts;

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::LlmError;
use crate::model::{CanonicalRecipe, LocalizedRecipe};

/// A single timed, parameterized robot operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RobotProgramStep {
    pub mode: String,
    pub duration_sec: u32,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub temperature_c: Option<u32>,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Planner output for one adaptation round. Mutated only by the safety
/// validator (numeric clamps and warning appends) before assembly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RobotPlan {
    #[serde(default)]
    pub robot_program: Vec<RobotProgramStep>,
    #[serde(default)]
    pub manual_steps: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Open clarification questions. Shape is defined by the planning
    /// collaborator and the client, not by this crate.
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub cannot_map: Vec<String>,
}

impl RobotPlan {
    /// A plan is resolved when it carries no open questions.
    pub fn is_resolved(&self) -> bool {
        self.questions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Internal,
    Web,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub query: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    pub robot_model: String,
    #[serde(default)]
    pub constraints: serde_json::Map<String, Value>,
}

fn default_lang() -> String {
    "ru".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContinueRequest {
    pub session_id: String,
    #[serde(default)]
    pub answers: serde_json::Map<String, Value>,
}

/// Fully assembled generation result: canonical recipe, localized text,
/// validated program and the canonical recipe's source URLs in one record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub recipe_id: String,
    pub lang: String,
    pub origin: Origin,
    pub canonical_recipe: CanonicalRecipe,
    pub localized: LocalizedRecipe,
    #[serde(default)]
    pub robot_program: Vec<RobotProgramStep>,
    #[serde(default)]
    pub manual_steps: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub questions: Vec<Value>,
    #[serde(default)]
    pub source_urls: Vec<String>,
}

/// One round's outcome: exactly one of `result` / non-empty `questions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub session_id: String,
    #[serde(default)]
    pub result: Option<RecipeResponse>,
    #[serde(default)]
    pub questions: Vec<Value>,
}

/// Failure taxonomy for the whole pipeline. Validation warnings are not
/// errors and never appear here.
#[derive(Debug)]
pub enum PipelineError {
    ProfileNotFound(String),
    SessionNotFound(String),
    RecipeNotFound(String),
    ApiKeyMissing,
    /// Transport failure, timeout or non-success status from a collaborator.
    Upstream(LlmError),
    /// Collaborator output that fails to parse against the expected shape.
    Malformed { stage: &'static str, detail: String },
}

impl PipelineError {
    /// Stable machine-readable indicator for the service boundary.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ProfileNotFound(_) => "robot_profile_not_found",
            PipelineError::SessionNotFound(_) => "session_not_found",
            PipelineError::RecipeNotFound(_) => "recipe_not_found",
            PipelineError::ApiKeyMissing => "api_key_not_configured",
            PipelineError::Upstream(_) => "upstream_unavailable",
            PipelineError::Malformed { .. } => "upstream_malformed",
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ProfileNotFound(model) => {
                write!(f, "robot profile '{}' not found", model)
            }
            PipelineError::SessionNotFound(id) => write!(f, "session '{}' not found", id),
            PipelineError::RecipeNotFound(id) => write!(f, "recipe '{}' not found", id),
            PipelineError::ApiKeyMissing => write!(f, "XAI_API_KEY is not configured"),
            PipelineError::Upstream(e) => write!(f, "upstream call failed: {}", e),
            PipelineError::Malformed { stage, detail } => {
                write!(f, "malformed {} output: {}", stage, detail)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<LlmError> for PipelineError {
    fn from(e: LlmError) -> Self {
        PipelineError::Upstream(e)
    }
}

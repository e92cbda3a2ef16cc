// src/protocol/planner.rs

use std::sync::Arc;

use schemars::schema_for;
use serde_json::{Map, Value, json};

use crate::llm::{self, GrokClient, ResponseRequest};
use crate::model::{CanonicalRecipe, RobotProfile};
use crate::protocol::{PipelineError, RobotPlan, prompts};

/// Everything one adaptation round feeds to the planning collaborator.
pub struct AdaptRequest<'a> {
    pub canonical: &'a CanonicalRecipe,
    pub profile: &'a RobotProfile,
    pub mapping_rules: &'a Value,
    pub constraints: &'a Map<String, Value>,
    /// Accumulated user answers from previous clarification rounds.
    pub answers: &'a Map<String, Value>,
    pub target_language: &'a str,
    pub query: &'a str,
}

/// Capability interface for producing a robot plan from a canonical recipe.
/// All planning intelligence is delegated; implementations only build the
/// request and parse the reply.
pub trait Planner: Send + Sync {
    fn adapt(&self, req: &AdaptRequest<'_>) -> Result<RobotPlan, PipelineError>;
}

pub struct GrokPlanner {
    client: Arc<GrokClient>,
    model: String,
    store: bool,
}

impl GrokPlanner {
    pub fn new(client: Arc<GrokClient>, model: &str, store: bool) -> Self {
        Self {
            client,
            model: model.to_string(),
            store,
        }
    }
}

impl Planner for GrokPlanner {
    fn adapt(&self, req: &AdaptRequest<'_>) -> Result<RobotPlan, PipelineError> {
        if !self.client.has_api_key() {
            return Err(PipelineError::ApiKeyMissing);
        }
        let (system, user) = prompts::adapt_to_robot();
        let payload = json!({
            "recipe": req.canonical,
            "robot_profile": req.profile,
            "mapping_rules": req.mapping_rules,
            "constraints": req.constraints,
            "answers": req.answers,
            "target_language": req.target_language,
            "recipe_query": req.query,
        });
        let user = format!(
            "{user}\n\n\
             IMPORTANT:\n\
             - Use 'answers' to resolve previous questions.\n\
             - If still missing data, return questions[] with concise prompts.\n\
             - Never exceed robot limits.\n\
             - robot_program should be runnable and explicit (mode/speed/temp/duration/attachment).\n\n\
             INPUT_PAYLOAD:\n{}",
            serde_json::to_string_pretty(&payload).unwrap()
        );
        let input = vec![
            json!({"role": "system", "content": system}),
            json!({"role": "user", "content": user}),
        ];
        let schema = serde_json::to_value(schema_for!(RobotPlan)).unwrap();
        let call = ResponseRequest::new(&self.model, input)
            .with_response_format(llm::response_format("RobotPlan", schema))
            .with_store(self.store)
            .with_max_output_tokens(2500);

        let resp = self.client.create_response(&call)?;
        let raw = llm::extract_output_text(&resp);
        let block = llm::extract_json_block(&raw).unwrap_or(raw);
        serde_json::from_str(&block).map_err(|e| PipelineError::Malformed {
            stage: "adapt",
            detail: e.to_string(),
        })
    }
}

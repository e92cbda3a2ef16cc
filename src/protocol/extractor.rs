// src/protocol/extractor.rs

use std::sync::Arc;

use schemars::schema_for;
use serde_json::{Value, json};

use crate::llm::{self, GrokClient, ResponseRequest};
use crate::model::CanonicalRecipe;
use crate::protocol::{PipelineError, prompts};

/// Capability interface for turning a free-text query into a canonical recipe.
pub trait Extractor: Send + Sync {
    fn extract(&self, query: &str) -> Result<CanonicalRecipe, PipelineError>;
}

/// Web search tool descriptor. Server-side execution only; keep the
/// allow/deny lists small.
fn web_search_tool(allowed: &[String], excluded: &[String]) -> Value {
    let mut tool = json!({"type": "web_search"});
    if !allowed.is_empty() {
        tool["allowed_domains"] = json!(allowed[..allowed.len().min(5)]);
    }
    if !excluded.is_empty() {
        tool["excluded_domains"] = json!(excluded[..excluded.len().min(5)]);
    }
    tool
}

/// Extraction through the tooling model with the web_search tool and a
/// strict CanonicalRecipe response schema.
pub struct GrokExtractor {
    client: Arc<GrokClient>,
    model: String,
    store: bool,
    allowed_domains: Vec<String>,
    excluded_domains: Vec<String>,
}

impl GrokExtractor {
    pub fn new(
        client: Arc<GrokClient>,
        model: &str,
        store: bool,
        allowed_domains: Vec<String>,
        excluded_domains: Vec<String>,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            store,
            allowed_domains,
            excluded_domains,
        }
    }
}

impl Extractor for GrokExtractor {
    fn extract(&self, query: &str) -> Result<CanonicalRecipe, PipelineError> {
        if !self.client.has_api_key() {
            return Err(PipelineError::ApiKeyMissing);
        }
        let (system, user) = prompts::extract_recipe(query);
        let input = vec![
            json!({"role": "system", "content": system}),
            json!({"role": "user", "content": user}),
        ];
        let schema = serde_json::to_value(schema_for!(CanonicalRecipe)).unwrap();
        let req = ResponseRequest::new(&self.model, input)
            .with_tools(vec![web_search_tool(
                &self.allowed_domains,
                &self.excluded_domains,
            )])
            .with_response_format(llm::response_format("CanonicalRecipe", schema))
            .with_store(self.store)
            .with_max_output_tokens(3000);

        let resp = self.client.create_response(&req)?;
        let raw = llm::extract_output_text(&resp);
        let block = llm::extract_json_block(&raw).unwrap_or(raw);
        serde_json::from_str(&block).map_err(|e| PipelineError::Malformed {
            stage: "extract",
            detail: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_descriptor_truncates_domain_lists() {
        let allowed: Vec<String> = (0..8).map(|i| format!("site{i}.com")).collect();
        let tool = web_search_tool(&allowed, &[]);
        assert_eq!(tool["type"], "web_search");
        assert_eq!(tool["allowed_domains"].as_array().unwrap().len(), 5);
        assert!(tool.get("excluded_domains").is_none());

        let bare = web_search_tool(&[], &[]);
        assert!(bare.get("allowed_domains").is_none());
    }
}

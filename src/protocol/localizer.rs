// src/protocol/localizer.rs

use std::sync::Arc;

use schemars::schema_for;
use serde_json::json;

use crate::llm::{self, GrokClient, ResponseRequest};
use crate::model::{CanonicalRecipe, Ingredient, LocalizedRecipe};
use crate::protocol::{PipelineError, prompts};

/// The canonical recipe language; localization into it needs no remote call.
const NATIVE_LANG_PREFIX: &str = "ru";

/// Capability interface for rendering a canonical recipe in a target language.
pub trait Localizer: Send + Sync {
    fn localize(&self, recipe: &CanonicalRecipe, lang: &str)
    -> Result<LocalizedRecipe, PipelineError>;
}

fn format_ingredient(i: &Ingredient) -> String {
    match (i.qty, i.unit) {
        (Some(qty), Some(unit)) => format!("{} — {} {}", i.name, qty, unit),
        _ => i.name.clone(),
    }
}

/// Pure local rendering in the canonical language.
fn render_native(recipe: &CanonicalRecipe) -> LocalizedRecipe {
    LocalizedRecipe {
        title: recipe.title.clone(),
        ingredients: recipe.ingredients.iter().map(format_ingredient).collect(),
        steps: recipe.steps.iter().map(|s| s.text.clone()).collect(),
    }
}

pub struct GrokLocalizer {
    client: Arc<GrokClient>,
    model: String,
    store: bool,
}

impl GrokLocalizer {
    pub fn new(client: Arc<GrokClient>, model: &str, store: bool) -> Self {
        Self {
            client,
            model: model.to_string(),
            store,
        }
    }
}

impl Localizer for GrokLocalizer {
    fn localize(
        &self,
        recipe: &CanonicalRecipe,
        lang: &str,
    ) -> Result<LocalizedRecipe, PipelineError> {
        if lang.to_lowercase().starts_with(NATIVE_LANG_PREFIX) {
            return Ok(render_native(recipe));
        }
        if !self.client.has_api_key() {
            return Err(PipelineError::ApiKeyMissing);
        }

        let (system, user) = prompts::localize(lang);
        let recipe_json = serde_json::to_string(recipe).unwrap();
        let input = vec![
            json!({"role": "system", "content": system}),
            json!({"role": "user", "content": format!("{user}\n\n{recipe_json}")}),
        ];
        let schema = serde_json::to_value(schema_for!(LocalizedRecipe)).unwrap();
        let call = ResponseRequest::new(&self.model, input)
            .with_response_format(llm::response_format("LocalizedRecipe", schema))
            .with_store(self.store);

        let resp = self.client.create_response(&call)?;
        let raw = llm::extract_output_text(&resp);
        let block = llm::extract_json_block(&raw).unwrap_or(raw);
        serde_json::from_str(&block).map_err(|e| PipelineError::Malformed {
            stage: "localize",
            detail: e.to_string(),
        })
    }
}

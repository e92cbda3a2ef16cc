// src/pipeline/mod.rs

use std::io;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::config::{MODEL_TOOLING, Settings};
use crate::llm::GrokClient;
use crate::model::{CanonicalRecipe, LocalizedRecipe};
use crate::protocol::extractor::{Extractor, GrokExtractor};
use crate::protocol::localizer::{GrokLocalizer, Localizer};
use crate::protocol::planner::{AdaptRequest, GrokPlanner, Planner};
use crate::protocol::{
    ContinueRequest, GenerateRequest, GenerateResponse, Origin, PipelineError, RecipeResponse,
    RobotPlan,
};
use crate::session::{ClarificationSession, SessionStore};
use crate::storage::{RecipeMeta, RecipeRepo, ResponseCache, RobotProfileRepo};
use crate::validation;

/// Built-in verb-stem → mode hints, passed opaquely to the planner.
pub fn default_mapping_rules() -> Value {
    json!({
        "verbs_to_modes": {
            "измельч": "CHOP",
            "нареж": "CHOP",
            "смеш": "MIX",
            "взбей": "WHISK",
            "замес": "KNEAD",
            "нагре": "HEAT",
            "вари": "HEAT",
            "туш": "HEAT",
            "пари": "STEAM",
        }
    })
}

/// Orchestrates one generation pipeline:
/// extract → adapt → validate → localize → assemble, with clarification
/// sessions carrying unanswered rounds.
pub struct RecipePipeline {
    extractor: Box<dyn Extractor>,
    planner: Box<dyn Planner>,
    localizer: Box<dyn Localizer>,
    profiles: RobotProfileRepo,
    recipes: RecipeRepo,
    sessions: SessionStore,
    cache: Option<ResponseCache>,
    mapping_rules: Value,
}

impl RecipePipeline {
    pub fn new(
        extractor: Box<dyn Extractor>,
        planner: Box<dyn Planner>,
        localizer: Box<dyn Localizer>,
        profiles: RobotProfileRepo,
        recipes: RecipeRepo,
        settings: &Settings,
    ) -> Self {
        Self {
            extractor,
            planner,
            localizer,
            profiles,
            recipes,
            sessions: SessionStore::new(settings.session_ttl_s, settings.session_maxsize),
            cache: None,
            mapping_rules: default_mapping_rules(),
        }
    }

    /// Full wiring against the live xAI collaborators.
    pub fn from_settings(settings: &Settings) -> Self {
        let client = Arc::new(GrokClient::new(
            &settings.xai_base_url,
            &settings.xai_api_key,
            settings.xai_timeout_s,
        ));
        let extractor = GrokExtractor::new(
            client.clone(),
            MODEL_TOOLING,
            settings.xai_store_messages,
            settings.web_allowed_domains.clone(),
            settings.web_excluded_domains.clone(),
        );
        let planner = GrokPlanner::new(
            client.clone(),
            &settings.xai_model_general,
            settings.xai_store_messages,
        );
        let localizer = GrokLocalizer::new(
            client,
            &settings.xai_model_general,
            settings.xai_store_messages,
        );
        Self::new(
            Box::new(extractor),
            Box::new(planner),
            Box::new(localizer),
            RobotProfileRepo::new(&settings.robot_profiles_dir),
            RecipeRepo::new(&settings.recipes_dir),
            settings,
        )
        .with_cache(ResponseCache::new(
            settings.cache_ttl_s,
            settings.cache_maxsize,
        ))
    }

    /// Memoize extraction results through `cache`.
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_mapping_rules(mut self, rules: Value) -> Self {
        self.mapping_rules = rules;
        self
    }

    /// Initial round: extract → adapt (no answers yet) → validate →
    /// localize → assemble. Open questions park the session for
    /// [`Self::resume`]; a resolved round retains nothing.
    pub fn start(&self, req: GenerateRequest) -> Result<GenerateResponse, PipelineError> {
        let profile = self
            .profiles
            .get(&req.robot_model)
            .ok_or_else(|| PipelineError::ProfileNotFound(req.robot_model.clone()))?;

        let session_id = Uuid::new_v4().to_string();
        let canonical = self.extract_cached(&req.query)?;

        let plan = self.planner.adapt(&AdaptRequest {
            canonical: &canonical,
            profile: &profile,
            mapping_rules: &self.mapping_rules,
            constraints: &req.constraints,
            answers: &Map::new(),
            target_language: &req.lang,
            query: &req.query,
        })?;
        let plan = validation::validate(plan, &profile);

        let localized = self.localizer.localize(&canonical, &req.lang)?;

        if plan.is_resolved() {
            let result = assemble(&session_id, Origin::Web, &canonical, localized, &plan, &req.lang);
            return Ok(GenerateResponse {
                session_id,
                result: Some(result),
                questions: Vec::new(),
            });
        }

        let questions = plan.questions.clone();
        let mut session = ClarificationSession::new(req, canonical);
        session.note_round(&questions);
        self.sessions.insert(&session_id, session);

        Ok(GenerateResponse {
            session_id,
            result: None,
            questions,
        })
    }

    /// Follow-up round: merge answers into the stored session, re-adapt the
    /// stored canonical recipe (never re-extracted), revalidate, reassemble.
    pub fn resume(&self, req: ContinueRequest) -> Result<GenerateResponse, PipelineError> {
        let session = self
            .sessions
            .merge_answers(&req.session_id, &req.answers)
            .ok_or_else(|| PipelineError::SessionNotFound(req.session_id.clone()))?;

        let profile = self
            .profiles
            .get(&session.robot_model)
            .ok_or_else(|| PipelineError::ProfileNotFound(session.robot_model.clone()))?;

        let plan = self.planner.adapt(&AdaptRequest {
            canonical: &session.canonical,
            profile: &profile,
            mapping_rules: &self.mapping_rules,
            constraints: &session.request.constraints,
            answers: &session.answers,
            target_language: &session.request.lang,
            query: &session.request.query,
        })?;
        let plan = validation::validate(plan, &profile);

        let localized = self
            .localizer
            .localize(&session.canonical, &session.request.lang)?;

        self.sessions.note_round(&req.session_id, &plan.questions);

        if plan.is_resolved() {
            let result = assemble(
                &req.session_id,
                Origin::Web,
                &session.canonical,
                localized,
                &plan,
                &session.request.lang,
            );
            return Ok(GenerateResponse {
                session_id: req.session_id,
                result: Some(result),
                questions: Vec::new(),
            });
        }

        Ok(GenerateResponse {
            session_id: req.session_id,
            result: None,
            questions: plan.questions,
        })
    }

    /// A stored recipe, localized, with no robot program attached.
    pub fn stored(&self, recipe_id: &str, lang: &str) -> Result<RecipeResponse, PipelineError> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| PipelineError::RecipeNotFound(recipe_id.to_string()))?;
        let localized = self.localizer.localize(&recipe, lang)?;
        Ok(RecipeResponse {
            recipe_id: recipe_id.to_string(),
            lang: lang.to_string(),
            origin: Origin::Internal,
            canonical_recipe: recipe,
            localized,
            robot_program: Vec::new(),
            manual_steps: Vec::new(),
            warnings: Vec::new(),
            questions: Vec::new(),
            source_urls: Vec::new(),
        })
    }

    pub fn list_recipes(&self) -> Vec<RecipeMeta> {
        self.recipes.list_meta()
    }

    pub fn save_recipe(&self, recipe_id: &str, recipe: &CanonicalRecipe) -> io::Result<()> {
        self.recipes.save(recipe_id, recipe)
    }

    fn extract_cached(&self, query: &str) -> Result<CanonicalRecipe, PipelineError> {
        let Some(cache) = &self.cache else {
            return self.extractor.extract(query);
        };

        let key = ResponseCache::key("extract", &json!({ "query": query }));
        if let Some(hit) = cache.get(&key) {
            if let Ok(recipe) = serde_json::from_value(hit) {
                return Ok(recipe);
            }
        }
        let recipe = self.extractor.extract(query)?;
        cache.set(&key, serde_json::to_value(&recipe).unwrap());
        Ok(recipe)
    }
}

fn assemble(
    recipe_id: &str,
    origin: Origin,
    canonical: &CanonicalRecipe,
    localized: LocalizedRecipe,
    plan: &RobotPlan,
    lang: &str,
) -> RecipeResponse {
    RecipeResponse {
        recipe_id: recipe_id.to_string(),
        lang: lang.to_string(),
        origin,
        canonical_recipe: canonical.clone(),
        localized,
        robot_program: plan.robot_program.clone(),
        manual_steps: plan.manual_steps.clone(),
        warnings: plan.warnings.clone(),
        questions: plan.questions.clone(),
        source_urls: canonical.source_urls.clone(),
    }
}

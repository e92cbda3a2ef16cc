// src/model/mod.rs

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed unit set for normalized ingredient quantities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    G,
    Kg,
    Ml,
    L,
    Pcs,
    Tsp,
    Tbsp,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::G => "g",
            Unit::Kg => "kg",
            Unit::Ml => "ml",
            Unit::L => "l",
            Unit::Pcs => "pcs",
            Unit::Tsp => "tsp",
            Unit::Tbsp => "tbsp",
        };
        f.write_str(s)
    }
}

/// Closed action vocabulary used as an adaptation hint on recipe steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    Chop,
    Mix,
    Whisk,
    Knead,
    Heat,
    Steam,
    Rest,
    Bake,
    Fry,
    Boil,
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Ingredient {
    /// Ingredient name in the canonical language.
    pub name: String,
    /// Quantity, normalized where possible.
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One human-readable recipe step plus optional structured hints for adaptation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Step {
    /// 1-based position in the recipe.
    pub idx: u32,
    pub text: String,
    #[serde(default)]
    pub action_type: Option<ActionType>,
    #[serde(default)]
    pub duration_sec: Option<u32>,
    #[serde(default)]
    pub temperature_c: Option<u32>,
    #[serde(default)]
    pub speed: Option<u32>,
    #[serde(default)]
    pub attachment: Option<String>,
}

/// Language-neutral source-of-truth recipe. Produced once per generation request
/// by the extraction collaborator and immutable for the life of the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalRecipe {
    pub title: String,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub prep_min: Option<u32>,
    #[serde(default)]
    pub cook_min: Option<u32>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source_urls: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Declared limits for a single robot operating mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RobotModeSpec {
    pub mode: String,
    /// Inclusive [lo, hi] speed bounds.
    #[serde(default)]
    pub speed_range: Option<(u32, u32)>,
    /// Inclusive [lo, hi] temperature bounds, °C.
    #[serde(default)]
    pub temp_c_range: Option<(u32, u32)>,
    #[serde(default)]
    pub max_duration_sec: Option<u32>,
    #[serde(default)]
    pub supports_pulse: Option<bool>,
    #[serde(default)]
    pub stir_speeds: Option<Vec<u32>>,
}

/// Capability descriptor for one robot model. Loaded read-only from the
/// profile store and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RobotProfile {
    pub robot_model: String,
    pub bowl_capacity_ml: u32,
    pub bowl_max_fill_ml: u32,
    pub bowl_max_mass_g: u32,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub modes: Vec<RobotModeSpec>,
    /// Device-specific hints passed opaquely to the planner.
    #[serde(default)]
    pub idioms: serde_json::Map<String, Value>,
}

impl RobotProfile {
    /// Exact-name mode lookup.
    pub fn mode_spec(&self, mode: &str) -> Option<&RobotModeSpec> {
        self.modes.iter().find(|m| m.mode == mode)
    }

    pub fn has_attachment(&self, attachment: &str) -> bool {
        self.attachments.iter().any(|a| a == attachment)
    }
}

/// Recipe text rendered for one target language.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocalizedRecipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_with_defaults() {
        let profile: RobotProfile = serde_json::from_str(
            r#"{
                "robot_model": "chef1",
                "bowl_capacity_ml": 2500,
                "bowl_max_fill_ml": 2000,
                "bowl_max_mass_g": 3000,
                "modes": [
                    {"mode": "HEAT", "temp_c_range": [50, 120], "max_duration_sec": 600}
                ]
            }"#,
        )
        .unwrap();

        assert!(profile.attachments.is_empty());
        assert!(profile.idioms.is_empty());
        let heat = profile.mode_spec("HEAT").unwrap();
        assert_eq!(heat.temp_c_range, Some((50, 120)));
        assert_eq!(heat.speed_range, None);
        assert!(profile.mode_spec("STEAM").is_none());
    }

    #[test]
    fn step_hints_are_optional() {
        let step: Step = serde_json::from_str(r#"{"idx": 1, "text": "Нарезать лук"}"#).unwrap();
        assert_eq!(step.action_type, None);
        assert_eq!(step.duration_sec, None);

        let tagged: Step = serde_json::from_str(
            r#"{"idx": 2, "text": "Разогреть", "action_type": "HEAT", "temperature_c": 90}"#,
        )
        .unwrap();
        assert_eq!(tagged.action_type, Some(ActionType::Heat));
    }

    #[test]
    fn units_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Unit::Tbsp).unwrap(), r#""tbsp""#);
        assert_eq!(Unit::G.to_string(), "g");
    }
}

// src/storage/recipes.rs

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::CanonicalRecipe;

/// Listing entry for the stored-recipe catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeMeta {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prep_min: Option<u32>,
    #[serde(default)]
    pub cook_min: Option<u32>,
}

/// File store: one `<recipe_id>.json` per canonical recipe.
pub struct RecipeRepo {
    dir: PathBuf,
}

impl RecipeRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn get(&self, recipe_id: &str) -> Option<CanonicalRecipe> {
        let path = self.dir.join(format!("{recipe_id}.json"));
        let data = fs::read_to_string(path).ok()?;
        serde_json::from_str(&data).ok()
    }

    pub fn save(&self, recipe_id: &str, recipe: &CanonicalRecipe) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{recipe_id}.json"));
        let json = serde_json::to_string_pretty(recipe)?;
        fs::write(path, json)
    }

    /// Catalog metadata for every readable recipe file, sorted by id.
    /// Unparseable files are skipped.
    pub fn list_meta(&self) -> Vec<RecipeMeta> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };

        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let path = e.path();
                if path.extension().and_then(|x| x.to_str()) != Some("json") {
                    return None;
                }
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .collect();
        ids.sort();

        ids.into_iter()
            .filter_map(|id| {
                let recipe = self.get(&id)?;
                Some(RecipeMeta {
                    id,
                    title: recipe.title,
                    tags: recipe.tags,
                    prep_min: recipe.prep_min,
                    cook_min: recipe.cook_min,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str) -> CanonicalRecipe {
        CanonicalRecipe {
            title: title.into(),
            servings: None,
            prep_min: Some(15),
            cook_min: Some(45),
            ingredients: vec![],
            steps: vec![],
            tags: vec!["суп".into()],
            source_urls: vec![],
            notes: None,
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RecipeRepo::new(dir.path());
        repo.save("borsch", &recipe("Борщ")).unwrap();

        let loaded = repo.get("borsch").unwrap();
        assert_eq!(loaded.title, "Борщ");
        assert!(repo.get("missing").is_none());
    }

    #[test]
    fn list_meta_sorts_and_skips_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RecipeRepo::new(dir.path());
        repo.save("pelmeni", &recipe("Пельмени")).unwrap();
        repo.save("borsch", &recipe("Борщ")).unwrap();
        fs::write(dir.path().join("broken.json"), "not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let meta = repo.list_meta();
        assert_eq!(meta.len(), 2);
        assert_eq!(meta[0].id, "borsch");
        assert_eq!(meta[0].title, "Борщ");
        assert_eq!(meta[1].id, "pelmeni");
        assert_eq!(meta[0].tags, vec!["суп".to_string()]);
    }

    #[test]
    fn list_meta_on_missing_dir_is_empty() {
        let repo = RecipeRepo::new("/nonexistent/recipes");
        assert!(repo.list_meta().is_empty());
    }
}

// src/config/mod.rs

use std::env;

/// Extraction/tooling model. Hardcoded on purpose: deployment env must not
/// override it.
pub const MODEL_TOOLING: &str = "grok-4-1-fast-non-reasoning";

/// Process configuration with env-var overrides.
#[derive(Clone, Debug)]
pub struct Settings {
    pub app_name: String,
    pub xai_base_url: String,
    pub xai_api_key: String,
    /// Model for adaptation and translation.
    pub xai_model_general: String,
    pub xai_timeout_s: u64,
    /// Ask the API to retain messages server-side.
    pub xai_store_messages: bool,
    pub robot_profiles_dir: String,
    pub recipes_dir: String,
    pub cache_ttl_s: u64,
    pub cache_maxsize: usize,
    pub session_ttl_s: u64,
    pub session_maxsize: usize,
    pub web_allowed_domains: Vec<String>,
    pub web_excluded_domains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "recipe-robot".into(),
            xai_base_url: "https://api.x.ai".into(),
            xai_api_key: String::new(),
            xai_model_general: "grok-4-1-fast-reasoning".into(),
            xai_timeout_s: 60,
            xai_store_messages: false,
            robot_profiles_dir: "data/robot_profiles".into(),
            recipes_dir: "data/recipes".into(),
            cache_ttl_s: 60 * 60 * 24,
            cache_maxsize: 10_000,
            session_ttl_s: 60 * 60 * 24,
            session_maxsize: 10_000,
            web_allowed_domains: Vec::new(),
            web_excluded_domains: split_csv("pinterest.com,facebook.com,instagram.com,tiktok.com"),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let d = Settings::default();
        Self {
            app_name: env_or("APP_NAME", d.app_name),
            xai_base_url: env_or("XAI_BASE_URL", d.xai_base_url),
            xai_api_key: env_or("XAI_API_KEY", d.xai_api_key),
            xai_model_general: env_or("XAI_MODEL_GENERAL", d.xai_model_general),
            xai_timeout_s: env_parsed("XAI_TIMEOUT_S", d.xai_timeout_s),
            xai_store_messages: env_flag("XAI_STORE_MESSAGES", d.xai_store_messages),
            robot_profiles_dir: env_or("ROBOT_PROFILES_DIR", d.robot_profiles_dir),
            recipes_dir: env_or("RECIPES_DIR", d.recipes_dir),
            cache_ttl_s: env_parsed("CACHE_TTL_S", d.cache_ttl_s),
            cache_maxsize: env_parsed("CACHE_MAXSIZE", d.cache_maxsize),
            session_ttl_s: env_parsed("SESSION_TTL_S", d.session_ttl_s),
            session_maxsize: env_parsed("SESSION_MAXSIZE", d.session_maxsize),
            web_allowed_domains: env::var("WEB_ALLOWED_DOMAINS")
                .map(|v| split_csv(&v))
                .unwrap_or(d.web_allowed_domains),
            web_excluded_domains: env::var("WEB_EXCLUDED_DOMAINS")
                .map(|v| split_csv(&v))
                .unwrap_or(d.web_excluded_domains),
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

/// Comma-separated list, trimmed, empty items dropped.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splits_trim_and_drop_empties() {
        assert_eq!(
            split_csv(" a.com, b.com ,,c.com,"),
            vec!["a.com".to_string(), "b.com".into(), "c.com".into()]
        );
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ").is_empty());
    }

    #[test]
    fn defaults_are_sane() {
        let s = Settings::default();
        assert_eq!(s.xai_base_url, "https://api.x.ai");
        assert!(s.xai_api_key.is_empty());
        assert!(!s.xai_store_messages);
        assert_eq!(s.cache_ttl_s, 86_400);
        assert!(s.web_excluded_domains.contains(&"pinterest.com".to_string()));
    }
}

//! Configuration settings for the Alto manual backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub ai: AiSettings,
    pub youtube: YoutubeSettings,
    pub uploads: UploadSettings,
    pub knowledge_base: KnowledgeBaseSettings,
    pub search: SearchSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Display name reported by the CLI and server banner.
    pub app_name: String,
    /// Version reported by `/health`.
    pub app_version: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            app_name: "Alto Car Digital Manual".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Generative AI provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Google Gemini via the Generative Language REST API.
    #[default]
    Gemini,
    /// OpenAI chat completions.
    OpenAi,
}

impl std::str::FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(AiProvider::Gemini),
            "openai" => Ok(AiProvider::OpenAi),
            _ => Err(format!("Unknown AI provider: {}", s)),
        }
    }
}

impl std::fmt::Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiProvider::Gemini => write!(f, "gemini"),
            AiProvider::OpenAi => write!(f, "openai"),
        }
    }
}

/// Generative AI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub provider: AiProvider,
    /// API key. Overridden by `GEMINI_API_KEY` / `OPENAI_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Base URL of the Generative Language API (gemini provider only).
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: AiProvider::Gemini,
            api_key: None,
            model: "gemini-1.5-pro-latest".to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 300,
        }
    }
}

impl AiSettings {
    /// Whether a non-empty credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeSettings {
    /// YouTube Data API key. Overridden by `YOUTUBE_API_KEY`.
    pub api_key: Option<String>,
    /// Maximum number of videos returned by an aggregated search.
    pub max_results: usize,
    /// Results requested from each individual query.
    pub per_query_limit: usize,
    /// Domain qualifier wrapped around every query; `{{query}}` is the raw query.
    pub query_template: String,
    pub relevance_language: String,
    pub safe_search: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            max_results: 5,
            per_query_limit: 2,
            query_template: "Maruti Alto {{query}} repair tutorial".to_string(),
            relevance_language: "en".to_string(),
            safe_search: "strict".to_string(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            timeout_secs: 30,
        }
    }
}

impl YoutubeSettings {
    /// Whether a non-empty credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }
}

/// Upload handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory uploaded files are written to and served from.
    pub dir: String,
    /// Maximum request body size in bytes.
    pub max_upload_bytes: usize,
    pub image_extensions: Vec<String>,
    pub video_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            dir: "static/uploads".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
            image_extensions: ["png", "jpg", "jpeg", "gif"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            video_extensions: ["mp4", "avi", "mov"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Knowledge base location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseSettings {
    pub path: String,
}

impl Default for KnowledgeBaseSettings {
    fn default() -> Self {
        Self {
            path: "data/alto_knowledge_base.json".to_string(),
        }
    }
}

/// Search query shapes used by the request handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Queries derived from an image analysis; `{{category}}` is the detected category.
    pub image_queries: Vec<String>,
    /// Queries behind `/popular-videos`.
    pub popular_queries: Vec<String>,
    /// Keywords used when none can be scraped from a model answer.
    pub fallback_keywords: Vec<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            image_queries: vec![
                "Alto {{category}}".to_string(),
                "Alto car maintenance".to_string(),
            ],
            popular_queries: vec![
                "Maruti Alto complete service".to_string(),
                "Alto car common problems".to_string(),
                "Alto maintenance guide".to_string(),
                "Alto troubleshooting".to_string(),
            ],
            fallback_keywords: vec![
                "Alto car repair".to_string(),
                "Maruti Alto maintenance".to_string(),
            ],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file, then apply the environment.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Settings>(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Override values from environment variables.
    ///
    /// `lookup` returns the value of a variable, if set.
    pub fn apply_env<F>(&mut self, lookup: F) -> crate::error::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ai_key_var = match self.ai.provider {
            AiProvider::Gemini => "GEMINI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        };
        if let Some(key) = lookup(ai_key_var) {
            self.ai.api_key = Some(key);
        }
        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.youtube.api_key = Some(key);
        }
        if let Some(size) = lookup("MAX_UPLOAD_SIZE") {
            self.uploads.max_upload_bytes = parse_env("MAX_UPLOAD_SIZE", &size)?;
        }
        if let Some(list) = lookup("ALLOWED_IMAGE_EXTENSIONS") {
            self.uploads.image_extensions = parse_list(&list);
        }
        if let Some(list) = lookup("ALLOWED_VIDEO_EXTENSIONS") {
            self.uploads.video_extensions = parse_list(&list);
        }
        if let Some(max) = lookup("YOUTUBE_MAX_RESULTS") {
            self.youtube.max_results = parse_env("YOUTUBE_MAX_RESULTS", &max)?;
        }
        if let Some(name) = lookup("APP_NAME") {
            self.general.app_name = name;
        }
        if let Some(version) = lookup("APP_VERSION") {
            self.general.app_version = version;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_env("PORT", &port)?;
        }
        if let Some(dir) = lookup("UPLOAD_DIR") {
            self.uploads.dir = dir;
        }
        if let Some(path) = lookup("KNOWLEDGE_BASE_PATH") {
            self.knowledge_base.path = path;
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ManualError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("alto-manual")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded upload directory path.
    pub fn upload_dir(&self) -> PathBuf {
        Self::expand_path(&self.uploads.dir)
    }

    /// Get the expanded knowledge base path.
    pub fn knowledge_base_path(&self) -> PathBuf {
        Self::expand_path(&self.knowledge_base.path)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> crate::error::Result<T> {
    value.trim().parse().map_err(|_| {
        crate::error::ManualError::Config(format!("{} has an invalid value: {}", name, value))
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.youtube.max_results, 5);
        assert_eq!(settings.youtube.per_query_limit, 2);
        assert_eq!(settings.uploads.max_upload_bytes, 16 * 1024 * 1024);
        assert_eq!(settings.ai.provider, AiProvider::Gemini);
        assert!(!settings.ai.has_api_key());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings
            .apply_env(lookup(&[
                ("GEMINI_API_KEY", "g-key"),
                ("YOUTUBE_API_KEY", "y-key"),
                ("MAX_UPLOAD_SIZE", "1024"),
                ("ALLOWED_IMAGE_EXTENSIONS", "PNG, .webp"),
                ("YOUTUBE_MAX_RESULTS", "8"),
                ("PORT", "8080"),
            ]))
            .unwrap();

        assert_eq!(settings.ai.api_key.as_deref(), Some("g-key"));
        assert!(settings.youtube.has_api_key());
        assert_eq!(settings.uploads.max_upload_bytes, 1024);
        assert_eq!(settings.uploads.image_extensions, vec!["png", "webp"]);
        assert_eq!(settings.uploads.video_extensions, vec!["mp4", "avi", "mov"]);
        assert_eq!(settings.youtube.max_results, 8);
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_openai_provider_reads_openai_key() {
        let mut settings = Settings::default();
        settings.ai.provider = AiProvider::OpenAi;
        settings
            .apply_env(lookup(&[("GEMINI_API_KEY", "g"), ("OPENAI_API_KEY", "sk-test")]))
            .unwrap();
        assert_eq!(settings.ai.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_invalid_env_value() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env(lookup(&[("MAX_UPLOAD_SIZE", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("MAX_UPLOAD_SIZE"));
    }

    #[test]
    fn test_partial_toml() {
        let settings: Settings = toml::from_str(
            r#"
            [ai]
            provider = "openai"
            model = "gpt-4o-mini"

            [youtube]
            max_results = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.ai.provider, AiProvider::OpenAi);
        assert_eq!(settings.ai.model, "gpt-4o-mini");
        assert_eq!(settings.youtube.max_results, 3);
        assert_eq!(settings.youtube.per_query_limit, 2);
        assert_eq!(settings.search.popular_queries.len(), 4);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Gemini".parse::<AiProvider>().unwrap(), AiProvider::Gemini);
        assert_eq!("openai".parse::<AiProvider>().unwrap(), AiProvider::OpenAi);
        assert!("claude".parse::<AiProvider>().is_err());
    }
}

//! Content analysis: prompt a generative model and scrape its answer.
//!
//! The [`ContentAnalyzer`] combines the knowledge base, a prompt template and
//! the user's question or image, sends it through a [`CompletionClient`], and
//! post-processes the answer into a category and search keywords.

mod extract;
mod gemini;
mod openai;

pub use extract::{
    extract_category, extract_keywords, scrape_keywords, CATEGORY_TRIGGERS, DEFAULT_CATEGORY,
    MAX_KEYWORDS,
};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::config::{AiProvider, AiSettings, Prompts, SearchSettings};
use crate::error::Result;
use crate::knowledge_base::KnowledgeBase;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Trait for generative completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Send a prompt, optionally with an image, and return the free-text answer.
    async fn complete(&self, prompt: &str, image: Option<&ImageInput>) -> Result<String>;
}

/// Create the completion client for the configured provider.
pub fn create_completion_client(settings: &AiSettings) -> Result<Arc<dyn CompletionClient>> {
    let client: Arc<dyn CompletionClient> = match settings.provider {
        AiProvider::Gemini => Arc::new(GeminiClient::new(settings)?),
        AiProvider::OpenAi => Arc::new(OpenAiClient::new(settings)?),
    };
    info!("Using {} completion model {}", settings.provider, client.model());
    Ok(client)
}

/// An image payload sent to the model.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageInput {
    /// Wrap raw bytes, deriving the mime type from the file name's extension.
    pub fn new(file_name: &str, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type_for(file_name).to_string(),
            data,
        }
    }

    /// Read an image from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Ok(Self::new(file_name, data))
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    /// `data:` URL form, as accepted by OpenAI vision inputs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// What the user asked about.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    Text(String),
    Image(ImageInput),
}

impl AnalysisInput {
    fn kind(&self) -> &'static str {
        match self {
            AnalysisInput::Text(_) => "text",
            AnalysisInput::Image(_) => "image",
        }
    }
}

/// Outcome of a content analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    fn completed(analysis: String, category: &str, keywords: Vec<String>) -> Self {
        Self {
            success: true,
            analysis,
            category: Some(category.to_string()),
            keywords,
            error: None,
        }
    }

    fn failed(error: String, analysis: String) -> Self {
        Self {
            success: false,
            analysis,
            category: None,
            keywords: Vec::new(),
            error: Some(error),
        }
    }
}

/// Prompt builder and answer post-processor around a completion client.
pub struct ContentAnalyzer {
    client: Arc<dyn CompletionClient>,
    knowledge_base: Arc<KnowledgeBase>,
    prompts: Prompts,
    fallback_keywords: Vec<String>,
}

impl ContentAnalyzer {
    /// Create an analyzer with default prompts and fallback keywords.
    pub fn new(client: Arc<dyn CompletionClient>, knowledge_base: Arc<KnowledgeBase>) -> Self {
        Self {
            client,
            knowledge_base,
            prompts: Prompts::default(),
            fallback_keywords: SearchSettings::default().fallback_keywords,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Keywords returned when none can be scraped from an answer.
    pub fn with_fallback_keywords(mut self, keywords: Vec<String>) -> Self {
        self.fallback_keywords = keywords;
        self
    }

    /// Render the prompt for the given input.
    pub fn build_prompt(&self, input: &AnalysisInput) -> String {
        let mut vars = HashMap::new();
        vars.insert("knowledge_base".to_string(), self.knowledge_base.to_prompt_text());

        match input {
            AnalysisInput::Text(query) => {
                vars.insert("query".to_string(), query.clone());
                self.prompts.render_with_custom(&self.prompts.analysis.text, &vars)
            }
            AnalysisInput::Image(_) => {
                self.prompts.render_with_custom(&self.prompts.analysis.image, &vars)
            }
        }
    }

    /// Analyze the input. Never fails: upstream errors become `success = false`.
    #[instrument(skip(self, input), fields(kind = input.kind()))]
    pub async fn analyze(&self, input: &AnalysisInput) -> AnalysisResult {
        let prompt = self.build_prompt(input);
        let image = match input {
            AnalysisInput::Image(image) => Some(image),
            AnalysisInput::Text(_) => None,
        };

        match self.client.complete(&prompt, image).await {
            Ok(text) => {
                let category = extract_category(&text);
                let keywords = extract_keywords(&text, &self.fallback_keywords);
                info!("Analysis complete: category={}, {} keywords", category, keywords.len());
                AnalysisResult::completed(text, category, keywords)
            }
            Err(e) => {
                warn!("Analysis failed: {}", e);
                let error = e.to_string();
                let analysis = match input {
                    AnalysisInput::Text(_) => format!("Error processing query: {}", error),
                    AnalysisInput::Image(_) => format!("Error analyzing image: {}", error),
                };
                AnalysisResult::failed(error, analysis)
            }
        }
    }
}

//! Request orchestration.
//!
//! Coordinates analysis, video search and response assembly for each input modality.

use crate::analysis::{
    create_completion_client, AnalysisInput, AnalysisResult, CompletionClient, ContentAnalyzer,
    ImageInput, DEFAULT_CATEGORY,
};
use crate::config::{Prompts, Settings};
use crate::error::{ManualError, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::uploads::{UploadStore, UploadedFile};
use crate::video_search::{
    AggregatedSearchResult, VideoResult, VideoSearchAggregator, VideoSearchProvider, YoutubeSearch,
};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Placeholder answer for uploaded videos.
pub const VIDEO_PLACEHOLDER: &str = "Video uploaded successfully. For detailed analysis, please extract a frame showing the issue and upload as an image.";

/// Declared input kind of an analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
    Video,
}

impl std::str::FromStr for Modality {
    type Err = ManualError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "image" => Ok(Modality::Image),
            "video" => Ok(Modality::Video),
            _ => Err(ManualError::InvalidInput("Invalid request type".to_string())),
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Image => write!(f, "image"),
            Modality::Video => write!(f, "video"),
        }
    }
}

/// Combined diagnosis and video list returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub modality: Modality,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub videos: Vec<VideoResult>,
    pub total_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub timestamp: String,
}

impl AnalysisResponse {
    fn new(modality: Modality, analysis: String) -> Self {
        Self {
            success: true,
            modality,
            analysis,
            category: None,
            keywords: Vec::new(),
            videos: Vec::new(),
            total_found: 0,
            image_url: None,
            video_url: None,
            timestamp: Local::now().to_rfc3339(),
        }
    }

    fn with_videos(mut self, search: AggregatedSearchResult) -> Self {
        self.total_found = search.total_found;
        self.videos = search.videos;
        self
    }
}

/// Runs the analyze → search → respond pipeline.
pub struct Orchestrator {
    settings: Settings,
    analyzer: ContentAnalyzer,
    search: VideoSearchAggregator,
    uploads: UploadStore,
}

impl Orchestrator {
    /// Create an orchestrator with the production providers.
    pub fn new(settings: Settings, knowledge_base: Arc<KnowledgeBase>) -> Result<Self> {
        let client = create_completion_client(&settings.ai)?;
        let provider: Arc<dyn VideoSearchProvider> =
            Arc::new(YoutubeSearch::new(&settings.youtube)?);
        Self::with_components(settings, knowledge_base, client, provider)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        knowledge_base: Arc<KnowledgeBase>,
        client: Arc<dyn CompletionClient>,
        provider: Arc<dyn VideoSearchProvider>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let analyzer = ContentAnalyzer::new(client, knowledge_base)
            .with_prompts(prompts)
            .with_fallback_keywords(settings.search.fallback_keywords.clone());

        let search = VideoSearchAggregator::new(
            provider,
            settings.youtube.per_query_limit,
            settings.youtube.max_results,
        );

        let uploads = UploadStore::new(settings.upload_dir(), &settings.uploads);

        Ok(Self {
            settings,
            analyzer,
            search,
            uploads,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn analyzer(&self) -> &ContentAnalyzer {
        &self.analyzer
    }

    pub fn search(&self) -> &VideoSearchAggregator {
        &self.search
    }

    /// Answer a text question with a diagnosis and matching videos.
    #[instrument(skip(self))]
    pub async fn analyze_text(&self, query: &str) -> Result<AnalysisResponse> {
        if query.trim().is_empty() {
            return Err(ManualError::InvalidInput("Query is required".to_string()));
        }

        let result = self
            .analyzer
            .analyze(&AnalysisInput::Text(query.to_string()))
            .await;
        let result = into_success(result)?;

        let queries = if result.keywords.is_empty() {
            vec![query.to_string()]
        } else {
            result.keywords.clone()
        };
        let videos = self.search.search(&queries).await;

        let mut response = AnalysisResponse::new(Modality::Text, result.analysis);
        response.category = result.category;
        response.keywords = result.keywords;
        Ok(response.with_videos(videos))
    }

    /// Store an image, diagnose it, and find videos for the detected category.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn analyze_image(&self, file: &UploadedFile) -> Result<AnalysisResponse> {
        let stored = self.uploads.save(file).await?;
        let image = ImageInput::new(&stored.file_name, file.data.clone());

        let result = into_success(self.analyzer.analyze(&AnalysisInput::Image(image)).await)?;

        let category = result
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let queries = self.image_queries(&category);
        let videos = self.search.search(&queries).await;

        let mut response = AnalysisResponse::new(Modality::Image, result.analysis);
        response.category = Some(category);
        response.image_url = Some(stored.url);
        Ok(response.with_videos(videos))
    }

    /// Store a video. Frame analysis is not performed.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn accept_video(&self, file: &UploadedFile) -> Result<AnalysisResponse> {
        let stored = self.uploads.save(file).await?;
        info!("Video stored at {}", stored.path.display());

        let mut response = AnalysisResponse::new(Modality::Video, VIDEO_PLACEHOLDER.to_string());
        response.video_url = Some(stored.url);
        Ok(response)
    }

    /// Videos for the configured popular queries.
    pub async fn popular_videos(&self) -> AggregatedSearchResult {
        self.search.search(&self.settings.search.popular_queries).await
    }

    /// Search queries derived from an image category.
    pub fn image_queries(&self, category: &str) -> Vec<String> {
        let mut vars = HashMap::new();
        vars.insert("category".to_string(), category.to_string());
        self.settings
            .search
            .image_queries
            .iter()
            .map(|template| Prompts::render(template, &vars))
            .collect()
    }
}

fn into_success(result: AnalysisResult) -> Result<AnalysisResult> {
    if result.success {
        Ok(result)
    } else {
        Err(ManualError::Analysis {
            message: result.error.unwrap_or_else(|| "Analysis failed".to_string()),
            analysis: result.analysis,
        })
    }
}

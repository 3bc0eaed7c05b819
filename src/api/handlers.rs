//! HTTP request handlers.

use super::types::{ApiError, HealthResponse, KnowledgeBaseResponse, ServiceHealth};
use super::AppState;
use crate::error::ManualError;
use crate::orchestrator::{AnalysisResponse, Modality};
use crate::uploads::{MediaKind, UploadedFile};
use crate::video_search::AggregatedSearchResult;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{error, info};

/// Fields of an `/analyze` form.
#[derive(Debug, Default)]
struct AnalyzeForm {
    kind: Option<String>,
    query: Option<String>,
    file: Option<UploadedFile>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "type" => form.kind = Some(field.text().await?),
                "query" => form.query = Some(field.text().await?),
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await?.to_vec();
                    form.file = Some(UploadedFile { file_name, data });
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Declared modality; defaults to text when absent.
    fn modality(&self) -> Result<Modality, ManualError> {
        match self.kind.as_deref() {
            None => Ok(Modality::Text),
            Some(kind) => kind.parse(),
        }
    }
}

/// Main analysis endpoint: text question, image upload, or video upload.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let form = AnalyzeForm::read(multipart?).await?;
    let modality = form.modality()?;
    info!("Analysis request: type={}", modality);

    let query = form.query.as_deref().unwrap_or_default().trim();
    let file = match modality {
        Modality::Text => {
            if query.is_empty() {
                return Err(ManualError::InvalidInput("Query is required".to_string()).into());
            }
            None
        }
        Modality::Image | Modality::Video => {
            let kind = if modality == Modality::Image {
                MediaKind::Image
            } else {
                MediaKind::Video
            };
            state.uploads.validate(form.file.as_ref(), kind)?;
            form.file.as_ref()
        }
    };

    let orchestrator = state.services.orchestrator()?;

    let result = match (modality, file) {
        (Modality::Text, _) => orchestrator.analyze_text(query).await,
        (Modality::Image, Some(file)) => orchestrator.analyze_image(file).await,
        (Modality::Video, Some(file)) => orchestrator.accept_video(file).await,
        (_, None) => Err(ManualError::InvalidInput("No file uploaded".to_string())),
    };

    result.map(Json).map_err(|e| {
        error!("Analysis request failed: {}", e);
        ApiError::from(e)
    })
}

/// Static vehicle knowledge base.
pub async fn knowledge_base(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(KnowledgeBaseResponse {
        success: true,
        data: state.knowledge_base.data().clone(),
    })
}

/// Videos for the configured popular maintenance queries.
pub async fn popular_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AggregatedSearchResult>, ApiError> {
    let orchestrator = state.services.orchestrator().map_err(|_| {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "YouTube service not configured")
    })?;

    Ok(Json(orchestrator.popular_videos().await))
}

/// Liveness and credential report.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        services: ServiceHealth {
            ai_provider: state.settings.ai.provider.to_string(),
            ai: state.settings.ai.has_api_key(),
            youtube: state.settings.youtube.has_api_key(),
            initialized: state.services.is_ready(),
        },
        version: state.settings.general.app_version.clone(),
    })
}

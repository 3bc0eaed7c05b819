//! HTTP API for the digital manual.
//!
//! Endpoints:
//! - `POST /analyze` multipart form (`type` = text | image | video, `query` or `file`)
//! - `GET /knowledge-base`
//! - `GET /popular-videos`
//! - `GET /uploads/{file}`
//! - `GET /health`

mod handlers;
mod types;

pub use handlers::{analyze, health, knowledge_base, popular_videos};
pub use types::{ApiError, ErrorResponse, HealthResponse, KnowledgeBaseResponse, ServiceHealth};

use crate::config::Settings;
use crate::error::{ManualError, Result};
use crate::knowledge_base::KnowledgeBase;
use crate::orchestrator::Orchestrator;
use crate::uploads::UploadStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const SERVICES_UNCONFIGURED: &str = "Services not properly configured. Please check API keys.";

/// Whether the upstream clients could be constructed at startup.
pub enum ServiceState {
    Ready(Arc<Orchestrator>),
    Unavailable { reason: String },
}

impl ServiceState {
    /// Build the production orchestrator, recording why it failed if it did.
    pub fn initialize(settings: &Settings, knowledge_base: Arc<KnowledgeBase>) -> Self {
        match Orchestrator::new(settings.clone(), knowledge_base) {
            Ok(orchestrator) => {
                info!("Upstream services initialized");
                ServiceState::Ready(Arc::new(orchestrator))
            }
            Err(e) => {
                warn!("Services initialization error: {}", e);
                ServiceState::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ServiceState::Ready(_))
    }

    /// Why initialization failed, if it did.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            ServiceState::Ready(_) => None,
            ServiceState::Unavailable { reason } => Some(reason),
        }
    }

    /// The orchestrator, or a service-unavailable error.
    pub fn orchestrator(&self) -> Result<&Orchestrator> {
        match self {
            ServiceState::Ready(orchestrator) => Ok(orchestrator),
            ServiceState::Unavailable { .. } => {
                Err(ManualError::ServiceUnavailable(SERVICES_UNCONFIGURED.to_string()))
            }
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub settings: Settings,
    pub services: ServiceState,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new(
        settings: Settings,
        services: ServiceState,
        knowledge_base: Arc<KnowledgeBase>,
    ) -> Self {
        let uploads = UploadStore::new(settings.upload_dir(), &settings.uploads);
        Self {
            settings,
            services,
            knowledge_base,
            uploads,
        }
    }
}

/// Build the API router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.settings.uploads.max_upload_bytes;
    let upload_dir = state.uploads.dir().to_path_buf();

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/knowledge-base", get(knowledge_base))
        .route("/popular-videos", get(popular_videos))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve the API until shutdown.
pub async fn start_server(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    state.uploads.ensure_dir().map_err(std::io::Error::other)?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await
}

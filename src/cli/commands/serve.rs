//! HTTP API server command.

use crate::api::{self, AppState, ServiceState};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use std::sync::Arc;

/// Run the HTTP API server.
///
/// The server starts even when upstream credentials are missing; analysis
/// requests then fail with a configuration error until keys are provided.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let knowledge_base = Arc::new(KnowledgeBase::load(&settings.knowledge_base_path())?);
    let services = ServiceState::initialize(&settings, knowledge_base.clone());

    Output::header(&format!("{} v{}", settings.general.app_name, settings.general.app_version));
    println!();
    if let Some(reason) = services.unavailable_reason() {
        Output::warning(&format!("Services unavailable: {}", reason));
        Output::info("Run 'alto-manual doctor' for detailed diagnostics.");
    }
    match knowledge_base.source() {
        Some(path) if !knowledge_base.is_empty() => {
            Output::kv("Knowledge base", &path.display().to_string());
        }
        _ => Output::warning("Knowledge base is empty."),
    }

    let addr = format!("{}:{}", host, port);
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Analyze", "POST /analyze");
    Output::kv("Knowledge base", "GET  /knowledge-base");
    Output::kv("Popular videos", "GET  /popular-videos");
    Output::kv("Uploads", "GET  /uploads/{file}");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    let state = Arc::new(AppState::new(settings, services, knowledge_base));
    api::start_server(&addr, state).await?;

    Ok(())
}

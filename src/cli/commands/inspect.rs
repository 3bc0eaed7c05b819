//! Inspect command: diagnose a photo of the car.

use crate::analysis::{AnalysisInput, ImageInput, DEFAULT_CATEGORY};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use crate::orchestrator::Orchestrator;
use crate::uploads::MediaKind;
use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;

/// Run the inspect command.
///
/// The image is read in place; nothing is copied into the upload directory.
pub async fn run_inspect(image: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'alto-manual doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let path = Settings::expand_path(image);
    if !path.exists() {
        bail!("Image not found: {}", path.display());
    }

    let knowledge_base = Arc::new(KnowledgeBase::load(&settings.knowledge_base_path())?);
    let orchestrator = Orchestrator::new(settings, knowledge_base)?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !orchestrator.uploads().is_allowed(file_name, MediaKind::Image) {
        bail!("Invalid file type: {}", display_name(&path));
    }

    let input = ImageInput::from_path(&path).await?;

    let spinner = Output::spinner("Analyzing image...");
    let result = orchestrator.analyzer().analyze(&AnalysisInput::Image(input)).await;
    spinner.finish_and_clear();

    if !result.success {
        let message = result.error.unwrap_or_else(|| "Image analysis failed".to_string());
        Output::error(&message);
        bail!(message);
    }

    println!("\n{}\n", result.analysis.trim());

    let category = result
        .category
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    Output::kv("Category", &category);

    let spinner = Output::spinner("Searching videos...");
    let videos = orchestrator
        .search()
        .search(&orchestrator.image_queries(&category))
        .await;
    spinner.finish_and_clear();

    Output::videos(&videos.videos, videos.total_found);

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

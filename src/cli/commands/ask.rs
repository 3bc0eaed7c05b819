//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use crate::orchestrator::{AnalysisResponse, Orchestrator};
use anyhow::Result;
use std::sync::Arc;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Analyze, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'alto-manual doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let knowledge_base = Arc::new(KnowledgeBase::load(&settings.knowledge_base_path())?);
    let orchestrator = Orchestrator::new(settings, knowledge_base)?;

    let spinner = Output::spinner("Analyzing question...");
    let result = orchestrator.analyze_text(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => {
            print_response(&response);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to analyze question: {}", e));
            Err(e.into())
        }
    }
}

/// Print an analysis with its category, keywords and videos.
pub(crate) fn print_response(response: &AnalysisResponse) {
    println!("\n{}\n", response.analysis.trim());

    if let Some(category) = &response.category {
        Output::kv("Category", category);
    }
    if !response.keywords.is_empty() {
        Output::kv("Keywords", &response.keywords.join(", "));
    }

    Output::videos(&response.videos, response.total_found);
}

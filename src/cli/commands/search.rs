//! Video search commands.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::video_search::{VideoSearchAggregator, YoutubeSearch, MAX_QUERIES};
use anyhow::Result;
use std::sync::Arc;

fn aggregator(settings: &Settings) -> Result<VideoSearchAggregator> {
    if let Err(e) = preflight::check(Operation::Search, settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'alto-manual doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let provider = Arc::new(YoutubeSearch::new(&settings.youtube)?);
    Ok(VideoSearchAggregator::new(
        provider,
        settings.youtube.per_query_limit,
        settings.youtube.max_results,
    ))
}

/// Run the search command.
pub async fn run_search(
    queries: &[String],
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    let aggregator = aggregator(&settings)?;

    if queries.len() > MAX_QUERIES {
        Output::warning(&format!(
            "Only the first {} queries are searched.",
            MAX_QUERIES
        ));
    }

    let limit = limit.unwrap_or_else(|| aggregator.max_results());
    let spinner = Output::spinner("Searching videos...");
    let result = aggregator
        .search_many(queries, settings.youtube.per_query_limit, limit)
        .await;
    spinner.finish_and_clear();

    Output::videos(&result.videos, result.total_found);

    Ok(())
}

/// Run the popular command.
pub async fn run_popular(settings: Settings) -> Result<()> {
    let aggregator = aggregator(&settings)?;

    Output::header("Popular maintenance topics");
    for query in settings.search.popular_queries.iter().take(MAX_QUERIES) {
        Output::list_item(query);
    }

    let spinner = Output::spinner("Searching videos...");
    let result = aggregator.search(&settings.search.popular_queries).await;
    spinner.finish_and_clear();

    Output::videos(&result.videos, result.total_found);

    Ok(())
}

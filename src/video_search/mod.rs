//! Video search and multi-query aggregation.
//!
//! A [`VideoSearchProvider`] answers one query at a time; the
//! [`VideoSearchAggregator`] fans a short list of queries out to it, merges
//! the results, drops duplicate videos and caps the list.

mod youtube;

pub use youtube::YoutubeSearch;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Maximum number of queries a single aggregation sends, to save API quota.
pub const MAX_QUERIES: usize = 3;

/// A video returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    /// Unique video identifier; the deduplication key.
    #[serde(rename = "video_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub channel: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Watch page URL.
    pub url: String,
    pub embed_url: String,
}

/// Trait for video search backends.
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Search for up to `limit` videos matching `query`.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoResult>>;
}

/// Result of a single search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub success: bool,
    pub videos: Vec<VideoResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Deduplicated, size-bounded result of several searches.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedSearchResult {
    pub success: bool,
    pub videos: Vec<VideoResult>,
    /// Number of unique videos found before truncation.
    pub total_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fans queries out to a provider and merges the results.
pub struct VideoSearchAggregator {
    provider: Arc<dyn VideoSearchProvider>,
    per_query_limit: usize,
    max_results: usize,
}

impl VideoSearchAggregator {
    /// Create an aggregator with per-query and overall limits.
    pub fn new(
        provider: Arc<dyn VideoSearchProvider>,
        per_query_limit: usize,
        max_results: usize,
    ) -> Self {
        Self {
            provider,
            per_query_limit,
            max_results,
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run a single query. Provider failures are reported, not raised.
    pub async fn search_one(&self, query: &str, limit: usize) -> SearchOutcome {
        match self.provider.search(query, limit).await {
            Ok(videos) => SearchOutcome {
                success: true,
                videos,
                error: None,
            },
            Err(e) => SearchOutcome {
                success: false,
                videos: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }

    /// Run up to [`MAX_QUERIES`] queries in order and merge their results.
    ///
    /// Failed queries contribute nothing and are not reported. Videos are
    /// deduplicated by id (first seen wins) and truncated to `overall_limit`;
    /// `total_found` counts unique videos before truncation.
    #[instrument(skip(self, queries), fields(queries = queries.len()))]
    pub async fn search_many(
        &self,
        queries: &[String],
        per_query_limit: usize,
        overall_limit: usize,
    ) -> AggregatedSearchResult {
        let mut all_videos = Vec::new();

        for query in queries.iter().take(MAX_QUERIES) {
            let outcome = self.search_one(query, per_query_limit).await;
            if outcome.success {
                debug!("Query {:?} returned {} videos", query, outcome.videos.len());
                all_videos.extend(outcome.videos);
            } else {
                warn!(
                    "Skipping failed query {:?}: {}",
                    query,
                    outcome.error.unwrap_or_default()
                );
            }
        }

        let mut videos = dedupe_videos(all_videos);
        let total_found = videos.len();
        videos.truncate(overall_limit);

        info!("Aggregated {} unique videos, returning {}", total_found, videos.len());

        AggregatedSearchResult {
            success: true,
            videos,
            total_found,
            error: None,
        }
    }

    /// [`Self::search_many`] with the configured limits.
    pub async fn search(&self, queries: &[String]) -> AggregatedSearchResult {
        self.search_many(queries, self.per_query_limit, self.max_results)
            .await
    }
}

/// Keep the first occurrence of each video id, preserving order.
pub fn dedupe_videos(videos: Vec<VideoResult>) -> Vec<VideoResult> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|v| seen.insert(v.id.clone()))
        .collect()
}

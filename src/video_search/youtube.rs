//! YouTube Data API v3 search provider.

use super::{VideoResult, VideoSearchProvider};
use crate::config::{Prompts, YoutubeSettings};
use crate::error::{ManualError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Searches YouTube for videos matching a domain-qualified query.
pub struct YoutubeSearch {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    query_template: String,
    relevance_language: String,
    safe_search: String,
}

impl YoutubeSearch {
    /// Create a provider from YouTube settings. Requires an API key.
    pub fn new(settings: &YoutubeSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                ManualError::Config("YouTube API key not found in configuration".to_string())
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            query_template: settings.query_template.clone(),
            relevance_language: settings.relevance_language.clone(),
            safe_search: settings.safe_search.clone(),
        })
    }

    /// Wrap the raw query with the domain qualifier.
    pub fn qualify(&self, query: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.trim().to_string());
        Prompts::render(&self.query_template, &vars)
    }

    fn search_url(&self, query: &str, limit: usize) -> Result<Url> {
        let endpoint = format!("{}/search", self.base_url);
        let limit = limit.to_string();
        Url::parse_with_params(
            &endpoint,
            &[
                ("part", "snippet"),
                ("q", query),
                ("maxResults", limit.as_str()),
                ("type", "video"),
                ("relevanceLanguage", self.relevance_language.as_str()),
                ("safeSearch", self.safe_search.as_str()),
                ("order", "relevance"),
            ],
        )
        .map_err(|e| ManualError::Config(format!("Invalid YouTube base URL: {}", e)))
    }
}

#[async_trait]
impl VideoSearchProvider for YoutubeSearch {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoResult>> {
        let qualified = self.qualify(query);
        let url = self.search_url(&qualified, limit)?;

        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ManualError::VideoSearch(error_message(status, &body)));
        }

        let parsed: SearchListResponse = serde_json::from_str(&body)?;
        let videos: Vec<VideoResult> = parsed.items.into_iter().filter_map(to_video).collect();
        debug!("YouTube returned {} videos for {:?}", videos.len(), qualified);
        Ok(videos)
    }
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    published_at: Option<String>,
    #[serde(default)]
    thumbnails: HashMap<String, Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn to_video(item: SearchItem) -> Option<VideoResult> {
    let id = item.id.video_id?;
    let snippet = item.snippet?;

    let thumbnail = ["medium", "high", "default"]
        .iter()
        .find_map(|size| snippet.thumbnails.get(*size))
        .map(|t| t.url.clone())
        .unwrap_or_default();

    let published_at = snippet
        .published_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));

    Some(VideoResult {
        url: format!("https://www.youtube.com/watch?v={}", id),
        embed_url: format!("https://www.youtube.com/embed/{}", id),
        id,
        title: snippet.title,
        description: snippet.description,
        thumbnail,
        channel: snippet.channel_title,
        published_at,
    })
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => format!("{}: {}", status.as_u16(), err.error.message),
        Err(_) => format!("{}: {}", status.as_u16(), body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> YoutubeSearch {
        let settings = YoutubeSettings {
            api_key: Some("yt-key".to_string()),
            ..YoutubeSettings::default()
        };
        YoutubeSearch::new(&settings).unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        assert!(YoutubeSearch::new(&YoutubeSettings::default()).is_err());
    }

    #[test]
    fn test_qualify() {
        assert_eq!(
            provider().qualify(" clutch plate "),
            "Maruti Alto clutch plate repair tutorial"
        );
    }

    #[test]
    fn test_search_url() {
        let url = provider().search_url("Maruti Alto fuse repair tutorial", 2).unwrap();
        assert_eq!(url.path(), "/youtube/v3/search");

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["q"], "Maruti Alto fuse repair tutorial");
        assert_eq!(params["maxResults"], "2");
        assert_eq!(params["type"], "video");
        assert_eq!(params["safeSearch"], "strict");
        assert!(!params.contains_key("key"));
    }

    #[test]
    fn test_parse_search_response() {
        let body = r#"{
            "items": [
                {
                    "id": {"kind": "youtube#video", "videoId": "abc123"},
                    "snippet": {
                        "publishedAt": "2021-03-04T05:06:07Z",
                        "title": "Alto brake pad replacement",
                        "description": "Step by step",
                        "channelTitle": "Garage Guru",
                        "thumbnails": {
                            "default": {"url": "https://i.ytimg.com/vi/abc123/default.jpg"},
                            "medium": {"url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg"}
                        }
                    }
                },
                {
                    "id": {"kind": "youtube#channel", "channelId": "UC1"},
                    "snippet": {"title": "A channel"}
                }
            ]
        }"#;

        let parsed: SearchListResponse = serde_json::from_str(body).unwrap();
        let videos: Vec<VideoResult> = parsed.items.into_iter().filter_map(to_video).collect();

        assert_eq!(videos.len(), 1);
        let video = &videos[0];
        assert_eq!(video.id, "abc123");
        assert_eq!(video.channel, "Garage Guru");
        assert_eq!(video.thumbnail, "https://i.ytimg.com/vi/abc123/mqdefault.jpg");
        assert_eq!(video.url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(video.embed_url, "https://www.youtube.com/embed/abc123");
        assert_eq!(
            video.published_at.map(|d| d.to_rfc3339()),
            Some("2021-03-04T05:06:07+00:00".to_string())
        );
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":403,"message":"quotaExceeded","errors":[]}}"#;
        assert_eq!(error_message(reqwest::StatusCode::FORBIDDEN, body), "403: quotaExceeded");
    }
}

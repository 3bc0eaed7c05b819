//! End-to-end tests for the HTTP API against stub upstream services.

use alto_manual::analysis::{CompletionClient, ImageInput};
use alto_manual::api::{build_router, AppState, ServiceState};
use alto_manual::config::Settings;
use alto_manual::knowledge_base::KnowledgeBase;
use alto_manual::orchestrator::{Orchestrator, VIDEO_PLACEHOLDER};
use alto_manual::video_search::{VideoResult, VideoSearchProvider};
use alto_manual::{ManualError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const TEXT_ANSWER: &str = "Likely a weak battery.\n\
Category: electrical\n\
Search Keywords: alto battery replacement, alto jump start\n";

struct StubCompletion {
    answer: std::result::Result<String, String>,
}

#[async_trait]
impl CompletionClient for StubCompletion {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, _prompt: &str, _image: Option<&ImageInput>) -> Result<String> {
        self.answer
            .clone()
            .map_err(ManualError::Completion)
    }
}

struct StubSearch;

#[async_trait]
impl VideoSearchProvider for StubSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<VideoResult>> {
        let slug = query.to_lowercase().replace(' ', "-");
        Ok((0..limit)
            .map(|i| {
                let id = format!("{}-{}", slug, i);
                VideoResult {
                    title: format!("Video {}", id),
                    description: String::new(),
                    thumbnail: String::new(),
                    channel: "Garage".to_string(),
                    published_at: None,
                    url: format!("https://www.youtube.com/watch?v={}", id),
                    embed_url: format!("https://www.youtube.com/embed/{}", id),
                    id,
                }
            })
            .collect())
    }
}

struct TestServer {
    base: String,
    client: reqwest::Client,
    _uploads: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn analyze(&self, form: Form) -> (u16, Value) {
        let response = self
            .client
            .post(self.url("/analyze"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }
}

async fn spawn_server(answer: std::result::Result<&str, &str>, ready: bool) -> TestServer {
    let uploads = tempfile::tempdir().unwrap();

    let mut settings = Settings::default();
    settings.uploads.dir = uploads.path().to_string_lossy().into_owned();
    settings.ai.api_key = Some("test-ai-key".to_string());
    settings.youtube.api_key = Some("test-youtube-key".to_string());

    let knowledge_base = Arc::new(KnowledgeBase::from_value(
        json!({"engine": {"oil_capacity": "3.1 L"}}),
    ));

    let services = if ready {
        let client = Arc::new(StubCompletion {
            answer: answer.map(str::to_string).map_err(str::to_string),
        });
        let orchestrator = Orchestrator::with_components(
            settings.clone(),
            knowledge_base.clone(),
            client,
            Arc::new(StubSearch),
        )
        .unwrap();
        ServiceState::Ready(Arc::new(orchestrator))
    } else {
        ServiceState::Unavailable {
            reason: "Gemini API key not found in configuration".to_string(),
        }
    };

    let state = Arc::new(AppState::new(settings, services, knowledge_base));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        _uploads: uploads,
    }
}

fn file_part(name: &str, bytes: &[u8]) -> Part {
    Part::bytes(bytes.to_vec()).file_name(name.to_string())
}

#[tokio::test]
async fn test_health_reports_services() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let body: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["gemini"], true);
    assert_eq!(body["services"]["ai_provider"], "gemini");
    assert_eq!(body["services"]["youtube"], true);
    assert_eq!(body["services"]["initialized"], true);
}

#[tokio::test]
async fn test_knowledge_base_endpoint() {
    let server = spawn_server(Ok(TEXT_ANSWER), false).await;

    let body: Value = reqwest::get(server.url("/knowledge-base"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["engine"]["oil_capacity"], "3.1 L");
}

#[tokio::test]
async fn test_text_analysis_returns_videos() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let form = Form::new()
        .text("type", "text")
        .text("query", "Car does not start in the morning");
    let (status, body) = server.analyze(form).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["type"], "text");
    assert_eq!(body["category"], "electrical");
    assert_eq!(body["keywords"][0], "alto battery replacement");

    let videos = body["videos"].as_array().unwrap();
    assert_eq!(videos.len(), 4);
    assert_eq!(body["total_found"], 4);
    assert!(videos[0]["video_id"].as_str().unwrap().starts_with("alto-battery"));
}

#[tokio::test]
async fn test_missing_type_defaults_to_text() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let (status, body) = server
        .analyze(Form::new().text("query", "Brakes squeal"))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "text");
}

#[tokio::test]
async fn test_rejects_invalid_requests() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let (status, body) = server
        .analyze(Form::new().text("type", "bogus").text("query", "x"))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Invalid request type");

    let (status, body) = server
        .analyze(Form::new().text("type", "text").text("query", "   "))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Query is required");

    let (status, body) = server.analyze(Form::new().text("type", "image")).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No file uploaded");

    let form = Form::new()
        .text("type", "image")
        .part("file", file_part("notes.txt", b"hello"));
    let (status, body) = server.analyze(form).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid file type");
}

#[tokio::test]
async fn test_image_analysis_stores_upload() {
    let server = spawn_server(Ok("The air filter is clogged.\nCategory: engine"), true).await;

    let image = [0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
    let form = Form::new()
        .text("type", "image")
        .part("file", file_part("filter photo.png", &image));
    let (status, body) = server.analyze(form).await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "image");
    assert_eq!(body["category"], "engine");

    let image_url = body["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with("_filter_photo.png"));

    let stored = reqwest::get(server.url(image_url)).await.unwrap();
    assert_eq!(stored.status().as_u16(), 200);
    assert_eq!(stored.bytes().await.unwrap().as_ref(), &image);
}

#[tokio::test]
async fn test_video_upload_returns_placeholder() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let form = Form::new()
        .text("type", "video")
        .part("file", file_part("noise.mp4", b"fake video"));
    let (status, body) = server.analyze(form).await;

    assert_eq!(status, 200);
    assert_eq!(body["type"], "video");
    assert_eq!(body["analysis"], VIDEO_PLACEHOLDER);
    assert!(body["video_url"].as_str().unwrap().ends_with("_noise.mp4"));
    assert_eq!(body["videos"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_failed_analysis_is_server_error() {
    let server = spawn_server(Err("quota exceeded"), true).await;

    let (status, body) = server
        .analyze(Form::new().text("type", "text").text("query", "Clutch slips"))
        .await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(body["analysis"]
        .as_str()
        .unwrap()
        .starts_with("Error processing query:"));
}

#[tokio::test]
async fn test_failed_image_analysis_is_server_error() {
    let server = spawn_server(Err("image rejected"), true).await;

    let form = Form::new()
        .text("type", "image")
        .part("file", file_part("dash.jpg", &[0xff, 0xd8]));
    let (status, body) = server.analyze(form).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Completion API error: image rejected");
    assert!(body["analysis"]
        .as_str()
        .unwrap()
        .starts_with("Error analyzing image:"));
}

#[tokio::test]
async fn test_unconfigured_services() {
    let server = spawn_server(Ok(TEXT_ANSWER), false).await;

    let (status, body) = server
        .analyze(Form::new().text("type", "text").text("query", "Clutch slips"))
        .await;
    assert_eq!(status, 500);
    assert_eq!(
        body["error"],
        "Services not properly configured. Please check API keys."
    );

    let response = reqwest::get(server.url("/popular-videos")).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "YouTube service not configured");
}

#[tokio::test]
async fn test_popular_videos() {
    let server = spawn_server(Ok(TEXT_ANSWER), true).await;

    let body: Value = reqwest::get(server.url("/popular-videos"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["success"], true);
    // Three of the four popular queries are searched, two videos each.
    assert_eq!(body["total_found"], 6);
    assert_eq!(body["videos"].as_array().unwrap().len(), 5);
}

//! Request and response types for the HTTP API.

use crate::error::ManualError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

/// Error payload returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// An error with the HTTP status it should be reported with.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                error: error.into(),
                analysis: None,
            },
        }
    }
}

impl From<ManualError> for ApiError {
    fn from(err: ManualError) -> Self {
        let status = err.status_code();
        match err {
            ManualError::Analysis { message, analysis } => Self {
                status,
                body: ErrorResponse {
                    success: false,
                    error: message,
                    analysis: Some(analysis),
                },
            },
            other => Self::new(status, other.to_string()),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `GET /knowledge-base` payload.
#[derive(Debug, Serialize)]
pub struct KnowledgeBaseResponse {
    pub success: bool,
    pub data: Value,
}

/// `GET /health` payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceHealth,
    pub version: String,
}

/// Credential presence and initialization state of upstream services.
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    /// Configured AI provider name.
    pub ai_provider: String,
    /// Whether the AI credential is present. Reported under the historical
    /// `gemini` key whatever the provider.
    #[serde(rename = "gemini")]
    pub ai: bool,
    /// Whether the YouTube credential is present.
    pub youtube: bool,
    pub initialized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_error_keeps_synthetic_text() {
        let err = ApiError::from(ManualError::Analysis {
            message: "timeout".to_string(),
            analysis: "Error processing query: timeout".to_string(),
        });
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "timeout");
        assert_eq!(json["analysis"], "Error processing query: timeout");
    }

    #[test]
    fn test_client_error_status() {
        let err = ApiError::from(ManualError::InvalidInput("Query is required".to_string()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(serde_json::to_value(&err.body).unwrap().get("analysis").is_none());
    }
}

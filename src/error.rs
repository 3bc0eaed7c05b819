//! Error types for the Alto manual backend.

use axum::http::StatusCode;
use thiserror::Error;

/// Library-level error type.
#[derive(Error, Debug)]
pub enum ManualError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UnsupportedFile(String),

    /// The analyzer answered with `success = false`.
    ///
    /// `analysis` carries the synthetic analysis text shown to the caller.
    #[error("{message}")]
    Analysis { message: String, analysis: String },

    #[error("Completion API error: {0}")]
    Completion(String),

    #[error("Video search error: {0}")]
    VideoSearch(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

impl ManualError {
    /// HTTP status the API layer reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ManualError::InvalidInput(_) | ManualError::UnsupportedFile(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, ManualError>;

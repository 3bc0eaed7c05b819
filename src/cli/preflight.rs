//! Pre-flight checks before calling upstream APIs.
//!
//! Validates that the required credentials are configured before starting
//! operations that would otherwise fail midway.

use crate::config::{AiProvider, Settings};
use crate::error::{ManualError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Analysis needs the AI key and the YouTube key.
    Analyze,
    /// Video search needs the YouTube key.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Analyze => {
            check_ai_key(settings)?;
            check_youtube_key(settings)?;
        }
        Operation::Search => {
            check_youtube_key(settings)?;
        }
    }
    Ok(())
}

/// Environment variable holding the AI key for the configured provider.
pub fn ai_key_var(settings: &Settings) -> &'static str {
    match settings.ai.provider {
        AiProvider::Gemini => "GEMINI_API_KEY",
        AiProvider::OpenAi => "OPENAI_API_KEY",
    }
}

fn check_ai_key(settings: &Settings) -> Result<()> {
    if settings.ai.has_api_key() {
        Ok(())
    } else {
        let var = ai_key_var(settings);
        Err(ManualError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        )))
    }
}

fn check_youtube_key(settings: &Settings) -> Result<()> {
    if settings.youtube.has_api_key() {
        Ok(())
    } else {
        Err(ManualError::Config(
            "YOUTUBE_API_KEY not set. Set it with: export YOUTUBE_API_KEY='...'".to_string(),
        ))
    }
}

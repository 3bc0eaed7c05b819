//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(
    action: &ConfigAction,
    config_path: Option<&PathBuf>,
    settings: Settings,
) -> Result<()> {
    let path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            println!("{}", render_redacted(&settings)?);
        }

        ConfigAction::Init => {
            if path.exists() {
                Output::warning(&format!("Config already exists at {}", path.display()));
                return Ok(());
            }

            let mut settings = settings;
            settings.ai.api_key = None;
            settings.youtube.api_key = None;
            settings.save_to(&path)?;
            Output::success(&format!("Created config at {}", path.display()));
            Output::info(
                "API keys are read from GEMINI_API_KEY / OPENAI_API_KEY and YOUTUBE_API_KEY.",
            );
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

/// Serialize settings with API keys masked.
fn render_redacted(settings: &Settings) -> Result<String> {
    let mut settings = settings.clone();
    settings.ai.api_key = settings.ai.api_key.as_deref().map(mask_key);
    settings.youtube.api_key = settings.youtube.api_key.as_deref().map(mask_key);

    toml::to_string_pretty(&settings)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))
}

pub(crate) fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "****");
        assert_eq!(mask_key("AIzaSyExample1234"), "AIza...1234");
    }

    #[test]
    fn test_show_hides_keys() {
        let mut settings = Settings::default();
        settings.ai.api_key = Some("AIzaSyVerySecretKey9876".to_string());
        let rendered = render_redacted(&settings).unwrap();
        assert!(!rendered.contains("VerySecret"));
        assert!(rendered.contains("AIza...9876"));
    }

    #[test]
    fn test_init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut settings = Settings::default();
        settings.youtube.api_key = Some("secret-youtube-key".to_string());

        run_config(&ConfigAction::Init, Some(&path), settings).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("secret-youtube-key"));
        assert!(written.contains("[server]"));
    }
}

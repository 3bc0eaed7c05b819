//! Configuration module.
//!
//! Handles loading application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnalysisPrompts, Prompts};
pub use settings::{
    AiProvider, AiSettings, GeneralSettings, KnowledgeBaseSettings, PromptSettings,
    SearchSettings, ServerSettings, Settings, UploadSettings, YoutubeSettings,
};

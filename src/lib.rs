//! Alto Manual - AI-assisted digital car manual
//!
//! A backend that answers questions about a Maruti Suzuki Alto, diagnoses
//! photos of its components, and pairs every answer with repair tutorials
//! found on YouTube.
//!
//! # Overview
//!
//! A request declares its modality:
//! - **text**: the question is analyzed against the vehicle knowledge base,
//!   keywords are extracted from the answer and used as video queries
//! - **image**: the upload is stored, the photo is analyzed, and videos are
//!   searched for the detected category
//! - **video**: the upload is stored and a placeholder answer is returned
//!
//! # Architecture
//!
//! - `config` - Settings, environment overrides and prompt templates
//! - `knowledge_base` - Static vehicle facts injected into prompts
//! - `analysis` - Completion clients (Gemini, OpenAI) and answer post-processing
//! - `video_search` - YouTube search and multi-query aggregation
//! - `uploads` - Upload validation and storage
//! - `orchestrator` - Per-modality pipeline
//! - `api` - HTTP endpoints
//! - `cli` - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use alto_manual::config::Settings;
//! use alto_manual::knowledge_base::KnowledgeBase;
//! use alto_manual::orchestrator::Orchestrator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let knowledge_base = Arc::new(KnowledgeBase::load(&settings.knowledge_base_path())?);
//!     let orchestrator = Orchestrator::new(settings, knowledge_base)?;
//!
//!     let response = orchestrator.analyze_text("Engine makes a knocking noise").await?;
//!     println!("{}", response.analysis);
//!     for video in &response.videos {
//!         println!("{}", video.url);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod openai;
pub mod orchestrator;
pub mod uploads;
pub mod video_search;

pub use error::{ManualError, Result};

//! Static vehicle knowledge base used to enrich prompts.

use crate::error::{ManualError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reference facts about the vehicle, loaded once at startup.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    data: Value,
    source: Option<PathBuf>,
}

impl KnowledgeBase {
    /// An empty knowledge base (`{}`).
    pub fn empty() -> Self {
        Self {
            data: Value::Object(Default::default()),
            source: None,
        }
    }

    /// Wrap an already parsed document.
    pub fn from_value(data: Value) -> Self {
        Self { data, source: None }
    }

    /// Load the knowledge base from a JSON file.
    ///
    /// A missing file yields an empty knowledge base; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Knowledge base not found at {}, using empty", path.display());
            return Ok(Self::empty());
        }

        let content = std::fs::read_to_string(path)?;
        let data: Value = serde_json::from_str(&content).map_err(|e| {
            ManualError::KnowledgeBase(format!("{}: {}", path.display(), e))
        })?;

        info!("Loaded knowledge base from {}", path.display());
        Ok(Self {
            data,
            source: Some(path.to_path_buf()),
        })
    }

    /// The raw JSON document.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// File the knowledge base was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        match &self.data {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => false,
        }
    }

    /// Pretty-printed JSON for embedding in prompts.
    pub fn to_prompt_text(&self) -> String {
        serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let kb = KnowledgeBase::load(&dir.path().join("nope.json")).unwrap();
        assert!(kb.is_empty());
        assert_eq!(kb.to_prompt_text(), "{}");
        assert!(kb.source().is_none());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, r#"{"model": "Alto 800", "fuel_tank_litres": 35}"#).unwrap();

        let kb = KnowledgeBase::load(&path).unwrap();
        assert!(!kb.is_empty());
        assert_eq!(kb.data()["model"], "Alto 800");
        assert!(kb.to_prompt_text().contains("\"fuel_tank_litres\": 35"));
        assert_eq!(kb.source(), Some(path.as_path()));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = KnowledgeBase::load(&path).unwrap_err();
        assert!(matches!(err, ManualError::KnowledgeBase(_)));
    }

    #[test]
    fn test_from_value() {
        let kb = KnowledgeBase::from_value(json!({"tyres": "145/80 R12"}));
        assert!(kb.to_prompt_text().contains("145/80 R12"));
    }
}

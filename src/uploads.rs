//! Upload validation and storage.

use crate::config::UploadSettings;
use crate::error::{ManualError, Result};
use chrono::Local;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Kind of media an upload is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub file_name: String,
    pub data: Vec<u8>,
}

/// A file written to the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_name: String,
    pub path: PathBuf,
    /// Public URL under `/uploads`.
    pub url: String,
}

/// Validates and stores uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    image_extensions: Vec<String>,
    video_extensions: Vec<String>,
}

impl UploadStore {
    pub fn new(dir: PathBuf, settings: &UploadSettings) -> Self {
        let normalize = |exts: &[String]| -> Vec<String> {
            exts.iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .collect()
        };

        Self {
            dir,
            image_extensions: normalize(&settings.image_extensions),
            video_extensions: normalize(&settings.video_extensions),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if needed.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Whether `file_name`'s extension is allowed for `kind`.
    pub fn is_allowed(&self, file_name: &str, kind: MediaKind) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_lowercase();

        let allowed = match kind {
            MediaKind::Image => &self.image_extensions,
            MediaKind::Video => &self.video_extensions,
        };
        allowed.iter().any(|a| *a == ext)
    }

    /// Check that an upload is present, named and of an allowed type.
    pub fn validate(&self, file: Option<&UploadedFile>, kind: MediaKind) -> Result<()> {
        let file = file.ok_or_else(|| ManualError::InvalidInput("No file uploaded".to_string()))?;

        if file.file_name.is_empty() {
            return Err(ManualError::InvalidInput("No file selected".to_string()));
        }

        if !self.is_allowed(&file.file_name, kind) {
            return Err(ManualError::UnsupportedFile("Invalid file type".to_string()));
        }

        Ok(())
    }

    /// Write the file under a timestamped, collision-resistant name.
    pub async fn save(&self, file: &UploadedFile) -> Result<StoredUpload> {
        let file_name = stored_name(&file.file_name);
        let path = self.dir.join(&file_name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &file.data).await?;
        info!("Stored upload {} ({} bytes)", file_name, file.data.len());

        Ok(StoredUpload {
            url: format!("/uploads/{}", file_name),
            file_name,
            path,
        })
    }
}

/// `<YYYYmmdd_HHMMSS>_<8 hex>_<sanitized name>`.
fn stored_name(original: &str) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", timestamp, &unique[..8], secure_filename(original))
}

/// Reduce a client file name to a safe ASCII basename.
pub fn secure_filename(name: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    let unsafe_chars = UNSAFE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid regex"));

    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(dir.to_path_buf(), &UploadSettings::default())
    }

    #[test]
    fn test_allowed_extensions() {
        let store = store(Path::new("/tmp"));
        assert!(store.is_allowed("dash.PNG", MediaKind::Image));
        assert!(store.is_allowed("a.b.jpeg", MediaKind::Image));
        assert!(!store.is_allowed("clip.mp4", MediaKind::Image));
        assert!(store.is_allowed("clip.mov", MediaKind::Video));
        assert!(!store.is_allowed("photo.jpg", MediaKind::Video));
        assert!(!store.is_allowed("noextension", MediaKind::Image));
    }

    #[test]
    fn test_validate() {
        let store = store(Path::new("/tmp"));

        let err = store.validate(None, MediaKind::Image).unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded");

        let unnamed = UploadedFile {
            file_name: String::new(),
            data: vec![1],
        };
        let err = store.validate(Some(&unnamed), MediaKind::Image).unwrap_err();
        assert_eq!(err.to_string(), "No file selected");

        let text = UploadedFile {
            file_name: "notes.txt".to_string(),
            data: vec![1],
        };
        let err = store.validate(Some(&text), MediaKind::Image).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Invalid file type");
    }

    #[test]
    fn test_secure_filename() {
        assert_eq!(secure_filename("My Dashboard.png"), "My_Dashboard.png");
        assert_eq!(secure_filename("../../etc/passwd"), "passwd");
        assert_eq!(secure_filename("C:\\Users\\me\\light.jpg"), "light.jpg");
        assert_eq!(secure_filename("ñandú?.gif"), "and.gif");
        assert_eq!(secure_filename("..."), "upload");
    }

    #[tokio::test]
    async fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir.path().join("uploads"));

        let file = UploadedFile {
            file_name: "engine bay.jpg".to_string(),
            data: b"jpeg".to_vec(),
        };
        let first = store.save(&file).await.unwrap();
        let second = store.save(&file).await.unwrap();

        assert_ne!(first.file_name, second.file_name);
        assert!(first.file_name.ends_with("_engine_bay.jpg"));
        assert_eq!(first.url, format!("/uploads/{}", first.file_name));
        assert_eq!(std::fs::read(&first.path).unwrap(), b"jpeg");
    }
}

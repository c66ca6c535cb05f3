//! Candidate and accepted file models, plus the byte sources behind them

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type used in encodings when the file declared none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Raw byte source behind a candidate file.
#[async_trait]
pub trait FileSource: Send + Sync + fmt::Debug {
    async fn read(&self) -> io::Result<Bytes>;
}

/// Bytes already held in memory (drop payloads, tests).
#[derive(Debug, Clone)]
pub struct MemorySource(Bytes);

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self(data.into())
    }
}

#[async_trait]
impl FileSource for MemorySource {
    async fn read(&self) -> io::Result<Bytes> {
        Ok(self.0.clone())
    }
}

/// A file on local disk, read lazily.
#[derive(Debug, Clone)]
pub struct PathSource(PathBuf);

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

#[async_trait]
impl FileSource for PathSource {
    async fn read(&self) -> io::Result<Bytes> {
        tokio::fs::read(&self.0).await.map(Bytes::from)
    }
}

/// A file offered to the intake pipeline, not yet validated.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub size: u64,
    /// Declared content type, may be empty.
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    source: Arc<dyn FileSource>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
        last_modified: DateTime<Utc>,
        source: Arc<dyn FileSource>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            content_type: content_type.into(),
            last_modified,
            source,
        }
    }

    /// Candidate backed by in-memory bytes; size is taken from the data.
    pub fn from_bytes(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self::new(
            name,
            size,
            content_type,
            last_modified,
            Arc::new(MemorySource::new(data)),
        )
    }

    /// Candidate for a file on disk. Size and modification time come from the
    /// filesystem; the content type is guessed from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let meta = tokio::fs::metadata(path).await?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = content_type_for_extension(&file_extension(&name))
            .unwrap_or_default()
            .to_string();
        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self::new(
            name,
            meta.len(),
            content_type,
            last_modified,
            Arc::new(PathSource::new(path)),
        ))
    }

    /// Lowercased extension after the last dot, empty if the name has none
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }

    pub fn is_image(&self) -> bool {
        self.content_type.to_lowercase().starts_with("image/")
    }

    pub async fn read(&self) -> io::Result<Bytes> {
        self.source.read().await
    }
}

/// A file accepted into the list, carrying its transportable encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedFile {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    /// `data:<content-type>;base64,<payload>`
    #[serde(alias = "base64")]
    pub encoding: String,
}

/// Coarse file category, derived from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
    Other,
}

impl FileKind {
    pub fn from_name(name: &str) -> Self {
        match file_extension(name).as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "heic" | "tif"
            | "tiff" => FileKind::Image,
            "pdf" | "txt" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "csv" | "rtf" => {
                FileKind::Document
            }
            _ => FileKind::Other,
        }
    }
}

/// Lowercased substring after the last `.` of a file name; empty when there is none.
pub fn file_extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Best-effort content type for a lowercased extension
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "heic" => "image/heic",
        "tif" | "tiff" => "image/tiff",
        // Videos
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "rtf" => "application/rtf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        _ => return None,
    };
    Some(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), "jpg");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_name("a.HEIC"), FileKind::Image);
        assert_eq!(FileKind::from_name("report.docx"), FileKind::Document);
        assert_eq!(FileKind::from_name("song.mp3"), FileKind::Other);
        assert_eq!(FileKind::from_name("noext"), FileKind::Other);
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(content_type_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for_extension("xyz"), None);
    }

    #[test]
    fn test_accepted_file_serialization() {
        let file = AcceptedFile {
            name: "a.txt".to_string(),
            size: 2,
            content_type: "text/plain".to_string(),
            encoding: "data:text/plain;base64,aGk=".to_string(),
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["encoding"], "data:text/plain;base64,aGk=");
    }

    #[test]
    fn test_accepted_file_accepts_legacy_base64_key() {
        let json = r#"{"name":"a.txt","size":2,"type":"text/plain","base64":"data:text/plain;base64,aGk="}"#;
        let file: AcceptedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.encoding, "data:text/plain;base64,aGk=");
    }

    #[tokio::test]
    async fn test_candidate_from_bytes() {
        let candidate = CandidateFile::from_bytes("x.PDF", "application/pdf", &b"%PDF"[..], Utc::now());
        assert_eq!(candidate.size, 4);
        assert_eq!(candidate.extension(), "pdf");
        assert!(!candidate.is_image());
        assert_eq!(candidate.read().await.unwrap(), Bytes::from_static(b"%PDF"));
    }

    #[tokio::test]
    async fn test_candidate_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello").unwrap();
        drop(file);

        let candidate = CandidateFile::from_path(&path).await.unwrap();
        assert_eq!(candidate.name, "notes.txt");
        assert_eq!(candidate.size, 5);
        assert_eq!(candidate.content_type, "text/plain");
        assert_eq!(candidate.read().await.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_candidate_from_path_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = CandidateFile::from_path(dir.path()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}

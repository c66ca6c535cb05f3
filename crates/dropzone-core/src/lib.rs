//! Dropzone Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! the intake pipeline and the hosts that drive it.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{parse_allowed_extensions, IntakeConfig};
pub use error::{IntakeError, IntakeResult, LogLevel};
pub use models::{
    content_type_for_extension, file_extension, AcceptedFile, CandidateFile, FileKind,
    FileMetadata, FileSource, GpsCoordinates, ImageMetadata, MemorySource, PathSource,
    DEFAULT_CONTENT_TYPE,
};

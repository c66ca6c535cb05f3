//! Error types module
//!
//! `IntakeError` covers the failures that abort an operation on the file list.
//! Policy rejections (too many files, disallowed type, oversized file) are not
//! errors: they are reported as user-facing text by the validation policy.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a stale remove index
    Debug,
    /// Warning level - for recoverable issues like bad configuration
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Failed to read \"{name}\": {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("File task failed: {0}")]
    Task(String),

    #[error("No file at index {index} (list has {len} files)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("File list and metadata list are misaligned ({files} files, {metadata} metadata records)")]
    MisalignedLists { files: usize, metadata: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

impl IntakeError {
    pub fn read(name: impl Into<String>, source: io::Error) -> Self {
        IntakeError::Read {
            name: name.into(),
            source,
        }
    }

    /// Level at which this error should be logged
    pub fn log_level(&self) -> LogLevel {
        match self {
            IntakeError::IndexOutOfRange { .. } => LogLevel::Debug,
            IntakeError::InvalidConfig(_) | IntakeError::Json(_) => LogLevel::Warn,
            IntakeError::Read { .. }
            | IntakeError::Task(_)
            | IntakeError::MisalignedLists { .. } => LogLevel::Error,
        }
    }

    /// Emit this error through `tracing` at its own level
    pub fn log(&self) {
        match self.log_level() {
            LogLevel::Debug => tracing::debug!(error = %self, "Intake operation rejected"),
            LogLevel::Warn => tracing::warn!(error = %self, "Intake operation failed"),
            LogLevel::Error => tracing::error!(error = %self, "Intake operation failed"),
        }
    }
}

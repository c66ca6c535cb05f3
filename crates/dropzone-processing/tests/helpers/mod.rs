pub mod fixtures;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dropzone_core::{CandidateFile, FileSource, IntakeConfig, MemorySource};

/// Source whose bytes can never be read
#[derive(Debug)]
pub struct FailingSource;

#[async_trait]
impl FileSource for FailingSource {
    async fn read(&self) -> io::Result<Bytes> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"))
    }
}

/// In-memory source that takes a while to read
#[derive(Debug)]
pub struct SlowSource {
    pub data: Bytes,
    pub delay: Duration,
}

#[async_trait]
impl FileSource for SlowSource {
    async fn read(&self) -> io::Result<Bytes> {
        tokio::time::sleep(self.delay).await;
        Ok(self.data.clone())
    }
}

pub fn text_file(name: &str, body: &str) -> CandidateFile {
    CandidateFile::from_bytes(name, "text/plain", body.as_bytes().to_vec(), Utc::now())
}

/// A candidate that declares `size` bytes without holding them.
pub fn declared_file(name: &str, content_type: &str, size: u64) -> CandidateFile {
    CandidateFile::new(
        name,
        size,
        content_type,
        Utc::now(),
        Arc::new(MemorySource::new(Bytes::new())),
    )
}

/// A candidate whose source holds more bytes than it declared.
pub fn grown_file(name: &str, declared: u64, actual: usize) -> CandidateFile {
    CandidateFile::new(
        name,
        declared,
        "application/octet-stream",
        Utc::now(),
        Arc::new(MemorySource::new(vec![0u8; actual])),
    )
}

pub fn failing_file(name: &str, size: u64) -> CandidateFile {
    CandidateFile::new(name, size, "text/plain", Utc::now(), Arc::new(FailingSource))
}

pub fn slow_file(name: &str, body: &str, delay_ms: u64) -> CandidateFile {
    let data = Bytes::from(body.as_bytes().to_vec());
    CandidateFile::new(
        name,
        data.len() as u64,
        "text/plain",
        Utc::now(),
        Arc::new(SlowSource {
            data,
            delay: Duration::from_millis(delay_ms),
        }),
    )
}

pub fn config(max_file_count: usize, allowed: &[&str]) -> IntakeConfig {
    IntakeConfig {
        max_file_count,
        allowed_extensions: allowed.iter().map(|e| e.to_string()).collect(),
        ..Default::default()
    }
}

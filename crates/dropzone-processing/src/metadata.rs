//! Metadata extraction
//!
//! Base fields come straight from the candidate. Images additionally get an
//! `exif` section read from the in-memory bytes. Extraction never fails: any
//! problem reading or decoding the image degrades to base metadata.

use dropzone_core::{CandidateFile, FileMetadata};

#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    pub async fn extract(&self, file: &CandidateFile) -> FileMetadata {
        let base = FileMetadata::from_candidate(file);
        if !file.is_image() {
            return base;
        }

        with_image_section(file, base).await
    }
}

#[cfg(feature = "image")]
async fn with_image_section(file: &CandidateFile, base: FileMetadata) -> FileMetadata {
    let data = match file.read().await {
        Ok(data) => data,
        Err(err) => {
            tracing::warn!(
                file_name = %file.name,
                error = %err,
                "Could not read image for metadata, using base metadata"
            );
            return base;
        }
    };

    // Header parsing and tag decoding are CPU-bound; run off the async pool.
    match tokio::task::spawn_blocking(move || crate::image::inspect(&data)).await {
        Ok(Some(image)) => base.with_image(image),
        Ok(None) => {
            tracing::debug!(
                file_name = %file.name,
                content_type = %file.content_type,
                "No image section for declared image"
            );
            base
        }
        Err(err) => {
            tracing::warn!(
                file_name = %file.name,
                error = %err,
                "Image inspection task failed, using base metadata"
            );
            base
        }
    }
}

#[cfg(not(feature = "image"))]
async fn with_image_section(_file: &CandidateFile, base: FileMetadata) -> FileMetadata {
    base
}

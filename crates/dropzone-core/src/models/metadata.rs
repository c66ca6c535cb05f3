//! Descriptive metadata records kept index-aligned with the accepted file list

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::file::{AcceptedFile, CandidateFile};

/// Metadata for one accepted file. `exif` is present only for images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    /// ISO-8601 instant, millisecond precision, UTC
    pub last_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exif: Option<ImageMetadata>,
}

impl FileMetadata {
    /// Base fields only, straight from the file handle
    pub fn from_candidate(file: &CandidateFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            content_type: file.content_type.clone(),
            last_modified: iso_instant(file.last_modified),
            exif: None,
        }
    }

    /// Stand-in record for a file restored from host state, whose original
    /// handle (and therefore modification time) is no longer available.
    pub fn placeholder(file: &AcceptedFile, now: DateTime<Utc>) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            content_type: file.content_type.clone(),
            last_modified: iso_instant(now),
            exif: None,
        }
    }

    pub fn with_image(mut self, image: ImageMetadata) -> Self {
        self.exif = Some(image);
        self
    }
}

/// Image-specific metadata. Every tag-sourced field is nullable; a missing tag
/// is `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub date_taken: Option<String>,
    pub camera: Option<String>,
    pub gps: Option<GpsCoordinates>,
    pub width: u32,
    pub height: u32,
    pub orientation: Option<u16>,
    pub iso: Option<u32>,
    pub focal_length: Option<f64>,
    pub exposure_time: Option<f64>,
    pub f_number: Option<f64>,
}

/// Raw coordinate values as embedded (degrees, minutes, seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
}

fn iso_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

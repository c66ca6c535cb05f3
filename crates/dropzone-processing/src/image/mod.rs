//! Image inspection module
//!
//! Reads what the metadata extractor needs from an image held in memory:
//! - pixel dimensions and container format (processor)
//! - embedded EXIF tags (tags)

pub mod processor;
pub mod tags;

pub use processor::{ImageProbe, ImageProcessor};
pub use tags::{read_container_tags, read_tags, TagBlock};

use dropzone_core::ImageMetadata;

/// Build the image section for an image held in memory.
///
/// A decodable image with no tag block yields a section with only dimensions.
/// An image the decoder cannot size (HEIF, TIFF without decoder support) still
/// gets a section when it carries tags, with dimensions taken from those tags.
/// Returns `None` for anything else and for a tag block that cannot be parsed;
/// callers then fall back to base metadata.
pub fn inspect(data: &[u8]) -> Option<ImageMetadata> {
    let Some(probe) = ImageProcessor::probe(data) else {
        return inspect_tags_only(data);
    };

    let decoded = (probe.width, probe.height);
    match read_tags(data, probe.format) {
        TagBlock::Present(exif) => Some(tags::image_metadata(Some(&exif), decoded)),
        TagBlock::Absent => Some(tags::image_metadata(None, decoded)),
        TagBlock::Corrupt(err) => {
            tracing::warn!(error = %err, "Embedded tag block could not be decoded");
            None
        }
    }
}

fn inspect_tags_only(data: &[u8]) -> Option<ImageMetadata> {
    match read_container_tags(data) {
        TagBlock::Present(exif) => Some(tags::image_metadata(Some(&exif), (0, 0))),
        TagBlock::Absent => None,
        TagBlock::Corrupt(err) => {
            tracing::debug!(error = %err, "No readable tags in undecodable image");
            None
        }
    }
}

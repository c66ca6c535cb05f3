//! Image processor - container format and dimensions

use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// What the decoder could tell about an image without decoding pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProbe {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Guess the format and read the dimensions from the image header.
    /// Returns `None` if the data is not an image this build can decode.
    pub fn probe(data: &[u8]) -> Option<ImageProbe> {
        let reader = match ImageReader::new(Cursor::new(data)).with_guessed_format() {
            Ok(reader) => reader,
            Err(err) => {
                tracing::debug!(error = %err, "Could not guess image format");
                return None;
            }
        };

        let format = reader.format()?;
        match reader.into_dimensions() {
            Ok((width, height)) => Some(ImageProbe {
                format,
                width,
                height,
            }),
            Err(err) => {
                tracing::debug!(error = %err, format = ?format, "Could not read image dimensions");
                None
            }
        }
    }
}

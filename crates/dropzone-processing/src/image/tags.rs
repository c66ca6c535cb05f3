//! Embedded EXIF tag extraction

use std::io::Cursor;

use ::exif::{Exif, Field, In, Reader, Tag, Value};
use chrono::NaiveDateTime;
use dropzone_core::{GpsCoordinates, ImageMetadata};
use image::ImageFormat;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Outcome of looking for an embedded tag block
pub enum TagBlock {
    Present(Exif),
    /// No tag block, or a container that cannot carry one
    Absent,
    Corrupt(::exif::Error),
}

/// Read the tag block of an image whose container format is already known.
pub fn read_tags(data: &[u8], format: ImageFormat) -> TagBlock {
    match format {
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Tiff => {
            read_container_tags(data)
        }
        _ => TagBlock::Absent,
    }
}

/// Read the tag block of any container the tag reader understands
/// (JPEG, PNG, WebP, TIFF, HEIF). Unknown containers come back `Corrupt`.
pub fn read_container_tags(data: &[u8]) -> TagBlock {
    let mut cursor = Cursor::new(data);
    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => TagBlock::Present(exif),
        Err(::exif::Error::NotFound(_)) => TagBlock::Absent,
        Err(err) => TagBlock::Corrupt(err),
    }
}

/// Map tags onto the image section. Embedded pixel dimensions win over the
/// `decoded` (width, height), which is `(0, 0)` when the decoder could not size it.
pub fn image_metadata(exif: Option<&Exif>, decoded: (u32, u32)) -> ImageMetadata {
    let (decoded_width, decoded_height) = decoded;
    let Some(exif) = exif else {
        return ImageMetadata {
            width: decoded_width,
            height: decoded_height,
            ..Default::default()
        };
    };

    let date_taken = ascii(exif, Tag::DateTimeOriginal)
        .or_else(|| ascii(exif, Tag::DateTime))
        .map(|raw| normalize_datetime(&raw));

    let camera = match (ascii(exif, Tag::Make), ascii(exif, Tag::Model)) {
        (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        _ => None,
    };

    let gps = match (
        rationals(exif, Tag::GPSLatitude),
        rationals(exif, Tag::GPSLongitude),
    ) {
        (Some(latitude), Some(longitude)) => Some(GpsCoordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    ImageMetadata {
        date_taken,
        camera,
        gps,
        width: dimension(exif, Tag::PixelXDimension, Tag::ImageWidth).unwrap_or(decoded_width),
        height: dimension(exif, Tag::PixelYDimension, Tag::ImageLength)
            .unwrap_or(decoded_height),
        orientation: uint(exif, Tag::Orientation).and_then(|o| u16::try_from(o).ok()),
        iso: uint(exif, Tag::PhotographicSensitivity),
        focal_length: rational(exif, Tag::FocalLength),
        exposure_time: rational(exif, Tag::ExposureTime),
        f_number: rational(exif, Tag::FNumber),
    }
}

/// `2024:05:01 10:20:30` becomes `2024-05-01T10:20:30`; unparsable text is kept as is.
pub fn normalize_datetime(raw: &str) -> String {
    NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT)
        .map(|dt| dt.format(ISO_DATETIME_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn field(exif: &Exif, tag: Tag) -> Option<&Field> {
    exif.get_field(tag, In::PRIMARY)
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &field(exif, tag)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|v| {
                String::from_utf8_lossy(v)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    field(exif, tag)?.value.get_uint(0)
}

fn dimension(exif: &Exif, pixel: Tag, image: Tag) -> Option<u32> {
    uint(exif, pixel)
        .filter(|v| *v > 0)
        .or_else(|| uint(exif, image).filter(|v| *v > 0))
}

fn rational(exif: &Exif, tag: Tag) -> Option<f64> {
    rationals(exif, tag)?.into_iter().next()
}

fn rationals(exif: &Exif, tag: Tag) -> Option<Vec<f64>> {
    let values: Vec<f64> = match &field(exif, tag)?.value {
        Value::Rational(values) => values.iter().map(|r| r.to_f64()).collect(),
        Value::SRational(values) => values.iter().map(|r| r.to_f64()).collect(),
        _ => return None,
    };

    if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(values)
}

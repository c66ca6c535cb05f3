use std::io::Cursor;

use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// Encoded PNG of the given size
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// Encoded JPEG without any embedded tags
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 200, 30]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .unwrap();
    buffer
}

/// JPEG carrying camera, capture time and GPS tags
pub fn create_tagged_jpeg(width: u32, height: u32) -> Vec<u8> {
    let fields = [
        ascii(Tag::Make, "FUJIFILM"),
        ascii(Tag::Model, "X-T4"),
        ascii(Tag::DateTimeOriginal, "2022:08:15 17:45:03"),
        Field {
            tag: Tag::Orientation,
            ifd_num: In::PRIMARY,
            value: Value::Short(vec![1]),
        },
        rational(Tag::FNumber, &[(56, 10)]),
        rational(Tag::GPSLatitude, &[(35, 1), (39, 1), (29, 1)]),
        rational(Tag::GPSLongitude, &[(139, 1), (41, 1), (30, 1)]),
    ];

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();

    insert_app1(&create_test_jpeg(width, height), &tiff.into_inner())
}

/// Splice an APP1 `Exif` segment right after the SOI marker.
fn insert_app1(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let segment_len = (tiff.len() + 2 + 6) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn rational(tag: Tag, values: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            values
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

//! Shared test utilities.
//!
//! Synthetic images are generated in memory so tests need no fixture files.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let png = png_bytes(1200, 900);
//! let shared = share_bytes(&RustBackend::new(), &FixedCaptioner("A cat"), &png, "a.png", &opts)?;
//! assert_eq!(jpeg_dimensions(&shared.record.payload.decode_bytes()?), (800, 600));
//! ```

use crate::caption::Captioner;
use crate::payload::Payload;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a `width`x`height` RGB gradient as PNG.
///
/// A gradient (rather than a flat fill) keeps the compressed IDAT stream
/// long enough that cutting the file in half lands inside pixel data.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x ^ y) & 0xFF) as u8,
        ])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Encode a `width`x`height` RGB gradient as JPEG carrying an EXIF
/// Orientation tag (1..=8) in an APP1 segment right after SOI.
pub fn jpeg_with_orientation(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 96])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    let jpeg = buf.into_inner();

    // Big-endian TIFF with one IFD entry: tag 0x0112, SHORT, count 1.
    let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, 0x00, 0x01];
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);
    let segment_len = (app1.len() + 2) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// Dimensions of an encoded JPEG. Panics if the bytes are not a JPEG.
pub fn jpeg_dimensions(bytes: &[u8]) -> (u32, u32) {
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "not a JPEG (missing SOI marker)");
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).unwrap();
    (img.width(), img.height())
}

// =========================================================================
// Captioners
// =========================================================================

/// Captioner that always answers with the same text.
pub struct FixedCaptioner(pub &'static str);

impl Captioner for FixedCaptioner {
    fn describe(&self, _payload: &Payload) -> String {
        self.0.to_string()
    }
}

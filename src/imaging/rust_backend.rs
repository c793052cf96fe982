//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Format sniffing | `image::ImageReader::with_guessed_format` |
//! | Identify | `ImageDecoder::dimensions` + `orientation` (header only, no pixel decode) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image` crate (pure Rust decoders) |
//! | Orient | `DynamicImage::apply_orientation` from the EXIF tag |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//!
//! The JPEG output carries no EXIF, so the orientation tag is baked into the
//! pixels before resizing, and [`identify`](ImageBackend::identify) reports
//! the displayed (post-rotation) dimensions. Width bounds therefore apply to
//! the width a viewer actually sees.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::CompressParams;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Sniff the container format from the leading bytes.
fn reader(source: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    let reader = ImageReader::new(Cursor::new(source)).with_guessed_format()?;
    if reader.format().is_none() {
        return Err(BackendError::Decode("unknown image format".into()));
    }
    Ok(reader)
}

/// Format-specific decoder with headers parsed.
fn decoder(source: &[u8]) -> Result<impl ImageDecoder + '_, BackendError> {
    reader(source)?
        .into_decoder()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// EXIF orientation, if the container has one. Unreadable metadata is
/// treated as upright.
fn orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    decoder.orientation().unwrap_or(Orientation::NoTransforms)
}

/// True when displaying the image swaps its width and height.
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// Decode an in-memory image, upright.
fn load_image(source: &[u8]) -> Result<DynamicImage, BackendError> {
    let mut decoder = decoder(source)?;
    let orientation = orientation(&mut decoder);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| BackendError::Decode(e.to_string()))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// JPEG has no alpha channel, so everything is flattened to RGB8 first.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let mut decoder = decoder(source)?;
        let (width, height) = decoder.dimensions();
        if swaps_axes(orientation(&mut decoder)) {
            Ok(Dimensions {
                width: height,
                height: width,
            })
        } else {
            Ok(Dimensions { width, height })
        }
    }

    fn compress(&self, source: &[u8], params: &CompressParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(source)?;
        let resized = if img.width() == params.width && img.height() == params.height {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };
        encode_jpeg(&resized, params.quality.jpeg_quality())
    }
}

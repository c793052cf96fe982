//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_bounded_dimensions;
use super::params::{CompressParams, Quality};
use crate::payload::Payload;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Configuration for link-sized compression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressConfig {
    /// Width bound in pixels. Narrower images are not upscaled.
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            quality: Quality::default(),
        }
    }
}

/// Output of [`compress`]: the displayable payload plus the geometry used.
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub payload: Payload,
    pub original: Dimensions,
    pub output: Dimensions,
}

/// Plan a compression without executing it.
pub fn plan_compression(original: Dimensions, config: &CompressConfig) -> CompressParams {
    let (width, height) = calculate_bounded_dimensions(original.as_tuple(), config.max_width);
    CompressParams {
        width,
        height,
        quality: config.quality,
    }
}

/// Shrink an image so it can ride inside a URL.
///
/// Bounds the width, re-encodes as JPEG at the configured quality, and wraps
/// the bytes as a `data:image/jpeg;base64,…` payload. Input that is not a
/// recognized image fails with [`BackendError::Decode`].
pub fn compress(
    backend: &impl ImageBackend,
    source: &[u8],
    config: &CompressConfig,
) -> Result<Compressed> {
    let original = backend.identify(source)?;
    let params = plan_compression(original, config);
    debug!(
        from = ?original.as_tuple(),
        to = ?(params.width, params.height),
        quality = params.quality.jpeg_quality(),
        "compressing image"
    );

    let jpeg = backend.compress(source, &params)?;
    let payload = Payload::from_bytes("image/jpeg", &jpeg);
    debug!(
        input_bytes = source.len(),
        output_bytes = jpeg.len(),
        payload_chars = payload.as_str().len(),
        "compressed image"
    );

    Ok(Compressed {
        payload,
        original,
        output: Dimensions {
            width: params.width,
            height: params.height,
        },
    })
}

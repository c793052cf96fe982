//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify and compress. Both work on in-memory bytes; the share
//! pipeline never writes intermediate images to disk.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate decoders and its baseline JPEG encoder.

use super::params::CompressParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The input bytes are not an image any compiled-in decoder recognizes.
    #[error("Not a recognized image: {0}")]
    Decode(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl BackendError {
    /// True when the failure means "this file is not an image".
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// Keeps the compression planning in [`operations`](super::operations)
/// independent of the pixel work, so planning is testable with a mock.
pub trait ImageBackend {
    /// Read intrinsic dimensions from the image header.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode, resize to the requested dimensions, and JPEG-encode.
    fn compress(&self, source: &[u8], params: &CompressParams) -> Result<Vec<u8>, BackendError>;
}

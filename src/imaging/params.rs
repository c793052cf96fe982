//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides the output geometry) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding fidelity in `(0, 1]`, default 0.6. Clamped on construction.
//! - [`CompressParams`]: Target dimensions and quality for one re-encode.

/// Lossy encoding quality as a fraction in `(0, 1]`.
///
/// The JPEG encoder works on a 1–100 scale; [`Quality::jpeg_quality`] does
/// the mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality(f32);

impl Quality {
    /// Smallest quality we hand to the encoder (maps to JPEG quality 1).
    pub const MIN: f32 = 0.01;

    /// Clamp into `[MIN, 1.0]`. NaN falls back to the default.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the encoder's 1–100 scale.
    pub fn jpeg_quality(self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.6)
    }
}

/// Parameters for a single decode → resize → JPEG encode pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressParams {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub quality: Quality,
}

//! Image compression: decode, bound the width, re-encode as JPEG.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Bound width** | pure math in `calculations` |
//! | **Resize → JPEG** | Lanczos3 + `JpegEncoder` |
//! | **Wrap** | [`Payload`](crate::payload::Payload) data URI |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{approximate_decoded_size, calculate_bounded_dimensions};
pub use operations::{CompressConfig, Compressed, compress, plan_compression};
pub use params::{CompressParams, Quality};
pub use rust_backend::RustBackend;

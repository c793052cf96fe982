//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate output dimensions for a width-bounded image.
///
/// Images wider than `max_width` are scaled down so the width equals
/// `max_width`, with the height scaled by the same ratio (rounded, never
/// below 1). Images at or under the bound keep their dimensions exactly.
/// Height is not bounded.
///
/// # Arguments
/// * `original` - Intrinsic image dimensions (width, height)
/// * `max_width` - Maximum output width in pixels
///
/// # Examples
/// ```
/// # use snaplink::imaging::calculate_bounded_dimensions;
/// // 1600x1200 bounded to 800 → 800x600
/// assert_eq!(calculate_bounded_dimensions((1600, 1200), 800), (800, 600));
///
/// // Narrow images are never upscaled
/// assert_eq!(calculate_bounded_dimensions((640, 480), 800), (640, 480));
/// ```
pub fn calculate_bounded_dimensions(original: (u32, u32), max_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;

    if orig_w <= max_width || max_width == 0 {
        return (orig_w, orig_h);
    }

    let ratio = max_width as f64 / orig_w as f64;
    let h = ((orig_h as f64 * ratio).round() as u32).max(1);
    (max_width, h)
}

/// Approximate decoded byte size of base64-style text: `round(len * 3 / 4)`.
///
/// Applied to a whole data URI this slightly over-counts (the `data:` prefix
/// is included), which is fine for a display figure.
pub fn approximate_decoded_size(encoded_len: usize) -> u64 {
    ((encoded_len as f64 * 3.0) / 4.0).round() as u64
}

//! Perceptual image comparison.
//!
//! The kernel works on flat RGBA buffers: [`diff`] is the full comparison,
//! [`diff_count`] and [`match_ratio`] reduce it to a single number, and
//! [`diff_images`] accepts decoded [`image::RgbaImage`]s at the harness
//! boundary. Every call is pure; nothing survives between invocations.

mod antialias;
mod delta;
pub mod diff;

use image::RgbaImage;

use crate::error::DiffError;
use crate::options::DiffOptions;

pub use self::diff::diff;

/// Outcome of one comparison.
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Number of pixels counted as genuinely different.
    pub diff_pixels: u64,
    /// Rendered diff image (flat RGBA, same layout as the inputs), present
    /// when rendering was requested.
    pub output: Option<Vec<u8>>,
}

/// Count differing pixels with default settings and the given threshold.
///
/// Runs the driver with rendering disabled; nothing is allocated beyond the
/// running count.
pub fn diff_count(
    left: &[u8],
    right: &[u8],
    width: u32,
    height: u32,
    threshold: f64,
) -> Result<u64, DiffError> {
    let options = DiffOptions {
        threshold,
        ..DiffOptions::default()
    };
    Ok(diff::diff(left, right, width, height, &options)?.diff_pixels)
}

/// Fraction of pixels considered equal, in `[0, 1]`.
///
/// Identical images yield exactly `1.0`, fully different images exactly
/// `0.0`. A zero-area image is rejected as [`DiffError::EmptyImage`] before
/// the division, so the ratio is never NaN.
pub fn match_ratio(
    left: &[u8],
    right: &[u8],
    width: u32,
    height: u32,
    options: &DiffOptions,
) -> Result<f64, DiffError> {
    let options = DiffOptions {
        render_output: false,
        ..options.clone()
    };
    let result = diff::diff(left, right, width, height, &options)?;
    let total = u64::from(width) * u64::from(height);
    Ok((1.0 - result.diff_pixels as f64 / total as f64).clamp(0.0, 1.0))
}

/// Compare two decoded images.
///
/// Convenience boundary for callers holding [`RgbaImage`]s; dimensions come
/// from the images themselves and must agree.
pub fn diff_images(
    left: &RgbaImage,
    right: &RgbaImage,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    if left.dimensions() != right.dimensions() {
        return Err(DiffError::DimensionMismatch {
            left_w: left.width(),
            left_h: left.height(),
            right_w: right.width(),
            right_h: right.height(),
        });
    }
    diff::diff(left.as_raw(), right.as_raw(), left.width(), left.height(), options)
}

/// The four bytes of the pixel at `(x, y)` in a row-major RGBA buffer.
#[inline]
pub(crate) fn rgba_at(buf: &[u8], x: u32, y: u32, width: u32) -> [u8; 4] {
    let pos = (y as usize * width as usize + x as usize) * 4;
    [buf[pos], buf[pos + 1], buf[pos + 2], buf[pos + 3]]
}

//! Comparison failures.

use thiserror::Error;

/// Precondition violations, all surfaced before any pixel work.
#[derive(Debug, Error)]
pub enum DiffError {
    /// The two decoded images disagree on size.
    #[error("dimension mismatch: {left_w}x{left_h} vs {right_w}x{right_h}")]
    DimensionMismatch {
        left_w: u32,
        left_h: u32,
        right_w: u32,
        right_h: u32,
    },

    /// A raw buffer does not hold `width * height` RGBA pixels.
    #[error(
        "buffer length mismatch: left {left_len}, right {right_len}, \
         expected {expected} bytes for {width}x{height} RGBA"
    )]
    BufferLength {
        left_len: usize,
        right_len: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Zero-area images have no pixels to compare and no defined ratio.
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// Threshold outside `[0, 1]`.
    #[error("threshold must be between 0.0 and 1.0, got {0}")]
    InvalidThreshold(f64),
}

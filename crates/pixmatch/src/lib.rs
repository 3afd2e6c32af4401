//! Perceptual pixel comparison for visual regression testing.
//!
//! Compares two equally sized RGBA buffers the way a reviewer would see
//! them: color distance is measured in YIQ space, where brightness counts
//! for far more than hue, and pixels that differ only because of
//! anti-aliased edges can be left out of the count. Byte equality is too
//! strict for screenshot tests; raw channel distance is too noisy. This
//! sits in between.
//!
//! ```
//! use pixmatch::{DiffOptions, diff};
//!
//! let red: Vec<u8> = [255, 0, 0, 255].repeat(16);
//! let blue: Vec<u8> = [0, 0, 255, 255].repeat(16);
//!
//! let result = diff(&red, &blue, 4, 4, &DiffOptions::default()).unwrap();
//! assert_eq!(result.diff_pixels, 16);
//! ```
//!
//! Decoding and encoding stay outside the kernel; the `pixmatch` binary is
//! a thin PNG harness around [`diff_images`].

pub mod compare;
pub mod error;
pub mod options;

pub use compare::{DiffResult, diff, diff_count, diff_images, match_ratio};
pub use error::DiffError;
pub use options::DiffOptions;

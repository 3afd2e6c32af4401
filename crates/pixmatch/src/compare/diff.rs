//! The per-pixel comparison loop.

use rayon::prelude::*;

use super::antialias::antialiased;
use super::delta::{MAX_YIQ_DELTA, blend, color_delta, rgb2y};
use super::{DiffResult, rgba_at};
use crate::error::DiffError;
use crate::options::DiffOptions;

/// Compare two RGBA buffers of `width` x `height` pixels.
///
/// Counts the pixels whose perceptual distance exceeds the threshold and,
/// when `options.render_output` is set, renders a same-sized diff image:
/// differing pixels in the diff highlight color, suppressed anti-aliasing
/// in its own highlight, matching pixels as a dimmed grayscale of `left`
/// (or transparent with `options.diff_mask`).
///
/// All validation happens before any pixel work; the inputs are borrowed
/// read-only and nothing is retained across calls.
pub fn diff(
    left: &[u8],
    right: &[u8],
    width: u32,
    height: u32,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    validate(left, right, width, height, options)?;

    // Threshold scaled into delta units.
    let cutoff = MAX_YIQ_DELTA * options.threshold * options.threshold;

    // Byte-identical inputs skip the per-pixel work entirely.
    if left == right {
        let output = options.render_output.then(|| {
            let mut out = vec![0u8; left.len()];
            if !options.diff_mask {
                out.par_chunks_exact_mut(4)
                    .zip(left.par_chunks_exact(4))
                    .for_each(|(dst, src)| {
                        draw_gray(dst, [src[0], src[1], src[2], src[3]], options.alpha);
                    });
            }
            out
        });
        return Ok(DiffResult {
            diff_pixels: 0,
            output,
        });
    }

    // Rows are independent: workers read both inputs freely, own disjoint
    // output rows, and the per-row counts combine by sum, so serial and
    // parallel runs agree byte for byte.
    let row_bytes = width as usize * 4;
    let (diff_pixels, output) = if options.render_output {
        let mut out = vec![0u8; left.len()];
        let count = out
            .par_chunks_exact_mut(row_bytes)
            .enumerate()
            .map(|(y, out_row)| {
                diff_row(left, right, width, height, y as u32, Some(out_row), cutoff, options)
            })
            .sum();
        (count, Some(out))
    } else {
        let count = (0..height)
            .into_par_iter()
            .map(|y| diff_row(left, right, width, height, y, None, cutoff, options))
            .sum();
        (count, None)
    };

    Ok(DiffResult {
        diff_pixels,
        output,
    })
}

fn validate(
    left: &[u8],
    right: &[u8],
    width: u32,
    height: u32,
    options: &DiffOptions,
) -> Result<(), DiffError> {
    if width == 0 || height == 0 {
        return Err(DiffError::EmptyImage { width, height });
    }
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(DiffError::InvalidThreshold(options.threshold));
    }
    let expected = width as usize * height as usize * 4;
    if left.len() != expected || right.len() != expected {
        return Err(DiffError::BufferLength {
            left_len: left.len(),
            right_len: right.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Classify one row of pixels; returns the row's diff count.
#[allow(clippy::too_many_arguments)]
fn diff_row(
    left: &[u8],
    right: &[u8],
    width: u32,
    height: u32,
    y: u32,
    mut out_row: Option<&mut [u8]>,
    cutoff: f64,
    options: &DiffOptions,
) -> u64 {
    let mut count = 0u64;

    for x in 0..width {
        let a = rgba_at(left, x, y, width);
        let b = rgba_at(right, x, y, width);

        let delta = color_delta(a, b, false);

        if delta.abs() <= cutoff {
            // Within tolerance: dim the original so real differences stand
            // out in review.
            if let Some(row) = out_row.as_deref_mut() {
                if !options.diff_mask {
                    draw_gray(row_px(row, x), a, options.alpha);
                }
            }
            continue;
        }

        // Over the cutoff. Either image may explain it as anti-aliasing.
        if !options.include_aa
            && (antialiased(left, right, x, y, width, height)
                || antialiased(right, left, x, y, width, height))
        {
            if let Some(row) = out_row.as_deref_mut() {
                if !options.diff_mask {
                    row_px(row, x).copy_from_slice(&options.aa_color);
                }
            }
            continue;
        }

        count += 1;
        if let Some(row) = out_row.as_deref_mut() {
            let color = if delta < 0.0 {
                options.diff_color_alt.unwrap_or(options.diff_color)
            } else {
                options.diff_color
            };
            row_px(row, x).copy_from_slice(&color);
        }
    }

    count
}

#[inline]
fn row_px(row: &mut [u8], x: u32) -> &mut [u8] {
    let pos = x as usize * 4;
    &mut row[pos..pos + 4]
}

/// Write the dimmed grayscale rendition of a matched pixel.
fn draw_gray(dst: &mut [u8], src: [u8; 4], alpha: f64) {
    let y = rgb2y(f64::from(src[0]), f64::from(src[1]), f64::from(src[2]));
    let val = blend(y, alpha * f64::from(src[3]) / 255.0).round() as u8;
    dst[0] = val;
    dst[1] = val;
    dst[2] = val;
    dst[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{diff_count, match_ratio};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const GRAY: [u8; 4] = [128, 128, 128, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn solid(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        px.repeat((w * h) as usize)
    }

    /// 5x5 image with a one-pixel anti-aliased edge: two white rows, a
    /// gray ramp row, two black rows.
    fn edge_image() -> Vec<u8> {
        [WHITE, WHITE, GRAY, BLACK, BLACK]
            .iter()
            .flat_map(|px| px.repeat(5))
            .collect()
    }

    #[test]
    fn identical_images_have_zero_diff() {
        let img = solid(4, 4, RED);
        let result = diff(&img, &img, 4, 4, &DiffOptions::default()).unwrap();
        assert_eq!(result.diff_pixels, 0);
        assert!(result.output.is_none());
    }

    #[test]
    fn completely_different_images_count_every_pixel() {
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, BLUE);
        let result = diff(&red, &blue, 4, 4, &DiffOptions::default()).unwrap();
        assert_eq!(result.diff_pixels, 16);
        assert!(result.output.is_none());
    }

    #[test]
    fn rendered_output_matches_input_layout() {
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, BLUE);
        let options = DiffOptions {
            render_output: true,
            ..DiffOptions::default()
        };
        let result = diff(&red, &blue, 4, 4, &options).unwrap();
        assert_eq!(result.diff_pixels, 16);

        let out = result.output.unwrap();
        assert_eq!(out.len(), 4 * 4 * 4);
        for px in out.chunks_exact(4) {
            assert_eq!(px, options.diff_color);
        }
    }

    #[test]
    fn simple_count_wrapper_returns_the_count() {
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, BLUE);
        assert_eq!(diff_count(&red, &blue, 4, 4, 0.1).unwrap(), 16);
    }

    #[test]
    fn match_ratio_is_exact_at_the_extremes() {
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, BLUE);
        let options = DiffOptions::default();
        assert_eq!(match_ratio(&red, &red, 4, 4, &options).unwrap(), 1.0);
        assert_eq!(match_ratio(&red, &blue, 4, 4, &options).unwrap(), 0.0);
    }

    #[test]
    fn subthreshold_nudge_is_not_a_difference() {
        let base = solid(8, 8, GRAY);
        let mut nudged = base.clone();
        // One channel off by one sits far below the default tolerance.
        nudged[0] = 129;
        let result = diff(&base, &nudged, 8, 8, &DiffOptions::default()).unwrap();
        assert_eq!(result.diff_pixels, 0);
    }

    #[test]
    fn comparison_is_symmetric() {
        let a = edge_image();
        let b = solid(5, 5, WHITE);
        for include_aa in [false, true] {
            let options = DiffOptions {
                include_aa,
                ..DiffOptions::default()
            };
            let ab = diff(&a, &b, 5, 5, &options).unwrap().diff_pixels;
            let ba = diff(&b, &a, 5, 5, &options).unwrap().diff_pixels;
            assert_eq!(ab, ba);
        }
    }

    #[test]
    fn raising_the_threshold_never_adds_differences() {
        let a = edge_image();
        let b = solid(5, 5, GRAY);
        let mut previous = u64::MAX;
        for threshold in [0.0, 0.05, 0.2, 0.6, 1.0] {
            let options = DiffOptions {
                threshold,
                include_aa: true,
                ..DiffOptions::default()
            };
            let count = diff(&a, &b, 5, 5, &options).unwrap().diff_pixels;
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn diff_count_is_bounded_by_the_pixel_count() {
        let a = edge_image();
        let b = solid(5, 5, BLUE);
        let options = DiffOptions {
            include_aa: true,
            ..DiffOptions::default()
        };
        let result = diff(&a, &b, 5, 5, &options).unwrap();
        assert!(result.diff_pixels <= 25);
        let ratio = match_ratio(&a, &b, 5, 5, &options).unwrap();
        assert!((0.0..=1.0).contains(&ratio));
    }

    #[test]
    fn antialiased_edge_is_suppressed_unless_included() {
        let flat = solid(5, 5, WHITE);
        let edged = edge_image();

        // The gray ramp row reads as anti-aliasing and is excluded; the two
        // black rows are genuine differences.
        let suppressed = diff(&flat, &edged, 5, 5, &DiffOptions::default()).unwrap();
        assert_eq!(suppressed.diff_pixels, 10);

        let included = diff(
            &flat,
            &edged,
            5,
            5,
            &DiffOptions {
                include_aa: true,
                ..DiffOptions::default()
            },
        )
        .unwrap();
        assert_eq!(included.diff_pixels, 15);
    }

    #[test]
    fn suppressed_pixels_get_the_antialias_highlight() {
        let flat = solid(5, 5, WHITE);
        let edged = edge_image();
        let options = DiffOptions {
            render_output: true,
            ..DiffOptions::default()
        };
        let result = diff(&flat, &edged, 5, 5, &options).unwrap();
        let out = result.output.unwrap();

        let px = |x: u32, y: u32| &out[(y as usize * 5 + x as usize) * 4..][..4];
        // Ramp row: anti-alias highlight. Black rows: diff highlight.
        assert_eq!(px(2, 2), options.aa_color);
        assert_eq!(px(2, 3), options.diff_color);
        // Matching white rows: dimmed grayscale, opaque.
        assert_eq!(px(2, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn matched_pixels_render_dimmed() {
        let img = solid(3, 3, GRAY);
        let options = DiffOptions {
            render_output: true,
            ..DiffOptions::default()
        };
        let result = diff(&img, &img, 3, 3, &options).unwrap();
        let out = result.output.unwrap();
        // blend(luma(128), 0.1) rounds to 242.
        for px in out.chunks_exact(4) {
            assert_eq!(px, [242, 242, 242, 255]);
        }
    }

    #[test]
    fn diff_mask_leaves_matches_transparent() {
        let img = solid(3, 3, GRAY);
        let options = DiffOptions {
            render_output: true,
            diff_mask: true,
            ..DiffOptions::default()
        };
        let result = diff(&img, &img, 3, 3, &options).unwrap();
        assert!(result.output.unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn alternative_color_marks_darkened_pixels() {
        let green: [u8; 4] = [0, 255, 0, 255];
        let options = DiffOptions {
            render_output: true,
            diff_color_alt: Some(green),
            ..DiffOptions::default()
        };

        // White to black darkens: alternative highlight.
        let result = diff(&WHITE.to_vec(), &BLACK.to_vec(), 1, 1, &options).unwrap();
        assert_eq!(result.output.unwrap(), green);

        // Black to white lightens: regular highlight.
        let result = diff(&BLACK.to_vec(), &WHITE.to_vec(), 1, 1, &options).unwrap();
        assert_eq!(result.output.unwrap(), options.diff_color);
    }

    #[test]
    fn zero_area_image_is_rejected() {
        let err = diff(&[], &[], 0, 4, &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::EmptyImage { .. }));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let img = solid(2, 2, RED);
        for threshold in [-0.1, 1.1, f64::NAN] {
            let options = DiffOptions {
                threshold,
                ..DiffOptions::default()
            };
            let err = diff(&img, &img, 2, 2, &options).unwrap_err();
            assert!(matches!(err, DiffError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn wrong_buffer_length_is_rejected() {
        let img = solid(2, 2, RED);
        let short = solid(2, 1, RED);
        let err = diff(&img, &short, 2, 2, &DiffOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::BufferLength { .. }));
    }

    #[test]
    fn extreme_thresholds_are_valid_inputs() {
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, BLUE);

        // Tolerance 1.0 accepts any color pair.
        assert_eq!(diff_count(&red, &blue, 4, 4, 1.0).unwrap(), 0);
        // Tolerance 0.0 still treats bit-identical pixels as equal.
        assert_eq!(diff_count(&red, &red, 4, 4, 0.0).unwrap(), 0);
        assert_eq!(diff_count(&red, &blue, 4, 4, 0.0).unwrap(), 16);
    }
}

//! Per-invocation comparison settings.

/// Immutable configuration for one comparison run.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Matching threshold (0.0-1.0); smaller is more sensitive.
    pub threshold: f64,
    /// Count anti-aliased pixels as differences.
    pub include_aa: bool,
    /// Opacity of the dimmed original under the diff overlay.
    pub alpha: f64,
    /// Highlight for pixels suppressed as anti-aliasing.
    pub aa_color: [u8; 4],
    /// Highlight for differing pixels.
    pub diff_color: [u8; 4],
    /// Alternative highlight for pixels that darken from left to right;
    /// falls back to `diff_color` when unset.
    pub diff_color_alt: Option<[u8; 4]>,
    /// Render differences over a transparent background instead of the
    /// dimmed original.
    pub diff_mask: bool,
    /// Materialize the rendered diff image.
    pub render_output: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            include_aa: false,
            alpha: 0.1,
            aa_color: [255, 255, 0, 255],
            diff_color: [255, 0, 0, 255],
            diff_color_alt: None,
            diff_mask: false,
            render_output: false,
        }
    }
}

pub fn validate_threshold(v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("threshold must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

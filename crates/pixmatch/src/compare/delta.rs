//! Perceptual color distance in YIQ space.
//!
//! Follows "Measuring perceived color difference using YIQ NTSC
//! transmission color space in mobile applications" (Kotsarenko & Ramos):
//! the metric weights luminance far above chrominance, matching how people
//! actually see a changed pixel.

/// Maximum possible value of the YIQ difference metric for 8-bit RGBA.
pub(crate) const MAX_YIQ_DELTA: f64 = 35215.0;

/// Perceptual distance between two RGBA pixels.
///
/// Bit-identical pixels return exactly `0.0`; the integer comparison runs
/// before any float math, so there is no rounding drift. Semi-transparent
/// pixels are blended over the white reference background first, which
/// makes fully transparent pixels compare equal regardless of their RGB
/// bytes. The sign encodes direction: negative when `a` is brighter.
///
/// With `luma_only` the result is the brightness difference alone, using
/// the same weights the full metric uses.
pub(crate) fn color_delta(a: [u8; 4], b: [u8; 4], luma_only: bool) -> f64 {
    if a == b {
        return 0.0;
    }

    let (r1, g1, b1) = blend_rgba(a);
    let (r2, g2, b2) = blend_rgba(b);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;

    if luma_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);

    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    // Sign tells the driver whether the pixel darkened or lightened, so it
    // can pick the alternative diff color.
    if y1 > y2 { -delta } else { delta }
}

/// Alpha-blend a pixel over the white reference background.
fn blend_rgba(px: [u8; 4]) -> (f64, f64, f64) {
    let r = f64::from(px[0]);
    let g = f64::from(px[1]);
    let b = f64::from(px[2]);
    if px[3] == 255 {
        return (r, g, b);
    }
    let a = f64::from(px[3]) / 255.0;
    (blend(r, a), blend(g, a), blend(b, a))
}

pub(crate) fn blend(channel: f64, alpha: f64) -> f64 {
    255.0 + (channel - 255.0) * alpha
}

pub(crate) fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

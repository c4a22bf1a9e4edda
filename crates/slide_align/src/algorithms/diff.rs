//! Perceptual per-pixel comparison of two equally sized bitmaps.
//!
//! Colour distance is measured in YIQ space. Pixels whose distance exceeds
//! `35215 * threshold^2` (35215 being the largest possible YIQ delta) differ.
//! A differing pixel that looks like anti-aliasing in either image can be
//! excluded from the result.

use image::{Luma, Rgba};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::{error::{AlignError, Result}, types::{Bitmap, Mask}};

const MAX_YIQ_DELTA: f64 = 35215.0;

/// Options for [`diff`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DiffOptions {
    /// Matching threshold in `[0, 1]`; smaller is more sensitive
    #[schemars(range(min = 0.0, max = 1.0))]
    pub threshold: f64,
    /// Count anti-aliased pixels as differences
    pub include_aa: bool,
    /// Opacity of the faded reference drawn under unchanged pixels
    #[schemars(range(min = 0.0, max = 1.0))]
    pub alpha: f64,
    pub diff_color: [u8; 3],
    pub aa_color: [u8; 3],
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            include_aa: false,
            alpha: 0.1,
            diff_color: [255, 0, 0],
            aa_color: [255, 255, 0],
        }
    }
}

impl DiffOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AlignError::InvalidConfig(format!(
                "diff threshold {} is outside [0, 1]",
                self.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(AlignError::InvalidConfig(format!(
                "diff alpha {} is outside [0, 1]",
                self.alpha
            )));
        }
        if self.diff_color == self.aa_color {
            return Err(AlignError::InvalidConfig(
                "diff and anti-aliasing colours must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output of [`diff`]
#[derive(Debug, Clone)]
pub struct DiffResult {
    /// Differences painted over a faded copy of the first input
    pub image: Bitmap,
    /// Number of pixels painted in the diff colour
    pub different_pixels: usize,
    mask: Mask,
}

impl DiffResult {
    /// Binary mask with 255 where a difference was found and 0 elsewhere.
    ///
    /// Independent of the colours and fading used for [`DiffResult::image`].
    pub fn foreground_mask(&self) -> Mask {
        self.mask.clone()
    }

    /// Differences in black on a white background
    pub fn luma(&self) -> Mask {
        let mut luma = self.mask.clone();
        image::imageops::invert(&mut luma);
        luma
    }
}

/// Compare `a` against `b` and paint the differences
pub fn diff(a: &Bitmap, b: &Bitmap, options: &DiffOptions) -> Result<DiffResult> {
    options.validate()?;
    if a.dimensions() != b.dimensions() {
        return Err(AlignError::DimensionMismatch {
            left_width: a.width(),
            left_height: a.height(),
            right_width: b.width(),
            right_height: b.height(),
        });
    }

    let (width, height) = a.dimensions();
    let max_delta = MAX_YIQ_DELTA * options.threshold * options.threshold;
    let [dr, dg, db] = options.diff_color;
    let [ar, ag, ab] = options.aa_color;
    let mut output = Bitmap::new(width, height);
    let mut mask = Mask::new(width, height);
    let mut different_pixels = 0;

    for y in 0..height {
        for x in 0..width {
            let pa = *a.get_pixel(x, y);
            let pb = *b.get_pixel(x, y);

            let delta = if pa == pb { 0.0 } else { color_delta(pa, pb, false) };

            let painted = if delta.abs() > max_delta {
                if !options.include_aa
                    && (antialiased(a, x, y, b) || antialiased(b, x, y, a))
                {
                    Rgba([ar, ag, ab, 255])
                } else {
                    different_pixels += 1;
                    mask.put_pixel(x, y, Luma([255]));
                    Rgba([dr, dg, db, 255])
                }
            } else {
                gray_pixel(pa, options.alpha)
            };
            output.put_pixel(x, y, painted);
        }
    }

    debug!(width, height, different_pixels, "computed image difference");

    Ok(DiffResult {
        image: output,
        different_pixels,
        mask,
    })
}

fn blend(channel: f64, alpha: f64) -> f64 {
    255.0 + (channel - 255.0) * alpha
}

fn rgb2y(r: f64, g: f64, b: f64) -> f64 {
    r * 0.29889531 + g * 0.58662247 + b * 0.11448223
}

fn rgb2i(r: f64, g: f64, b: f64) -> f64 {
    r * 0.59597799 - g * 0.27417610 - b * 0.32180189
}

fn rgb2q(r: f64, g: f64, b: f64) -> f64 {
    r * 0.21147017 - g * 0.52261711 + b * 0.31114694
}

/// Channels blended over white, so transparency reads as lightness
fn over_white(p: Rgba<u8>) -> (f64, f64, f64) {
    let [r, g, b, a] = p.0.map(f64::from);
    if a < 255.0 {
        let alpha = a / 255.0;
        (blend(r, alpha), blend(g, alpha), blend(b, alpha))
    } else {
        (r, g, b)
    }
}

/// Squared YIQ distance, negative when `p1` is the brighter pixel.
/// With `y_only` only the signed brightness difference is returned.
fn color_delta(p1: Rgba<u8>, p2: Rgba<u8>, y_only: bool) -> f64 {
    if p1 == p2 {
        return 0.0;
    }
    let (r1, g1, b1) = over_white(p1);
    let (r2, g2, b2) = over_white(p2);

    let y1 = rgb2y(r1, g1, b1);
    let y2 = rgb2y(r2, g2, b2);
    let y = y1 - y2;
    if y_only {
        return y;
    }

    let i = rgb2i(r1, g1, b1) - rgb2i(r2, g2, b2);
    let q = rgb2q(r1, g1, b1) - rgb2q(r2, g2, b2);
    let delta = 0.5053 * y * y + 0.299 * i * i + 0.1957 * q * q;

    if y1 > y2 { -delta } else { delta }
}

fn gray_pixel(p: Rgba<u8>, alpha: f64) -> Rgba<u8> {
    let y = rgb2y(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]));
    let value = blend(y, alpha * f64::from(p[3]) / 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba([value, value, value, 255])
}

/// Inclusive 3x3 window around `(x, y)` clipped to the image, and whether it was clipped
fn window(x: u32, y: u32, width: u32, height: u32) -> (u32, u32, u32, u32, bool) {
    let x0 = x.saturating_sub(1);
    let y0 = y.saturating_sub(1);
    let x2 = (x + 1).min(width - 1);
    let y2 = (y + 1).min(height - 1);
    let on_edge = x == x0 || x == x2 || y == y0 || y == y2;
    (x0, y0, x2, y2, on_edge)
}

/// Whether the pixel at `(x, y)` of `img` looks like an anti-aliasing blend.
///
/// A blend pixel sits between a darkest and a brightest neighbour, and at least
/// one of those extremes belongs to a flat area in both images.
fn antialiased(img: &Bitmap, x: u32, y: u32, other: &Bitmap) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2, on_edge) = window(x, y, width, height);
    let center = *img.get_pixel(x, y);

    let mut zeroes = usize::from(on_edge);
    let mut min = 0.0;
    let mut max = 0.0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0, 0, 0, 0);

    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            let delta = color_delta(center, *img.get_pixel(nx, ny), true);
            if delta == 0.0 {
                zeroes += 1;
                if zeroes > 2 {
                    return false;
                }
            } else if delta < min {
                min = delta;
                min_x = nx;
                min_y = ny;
            } else if delta > max {
                max = delta;
                max_x = nx;
                max_y = ny;
            }
        }
    }

    if min == 0.0 || max == 0.0 {
        return false;
    }

    (has_many_siblings(img, min_x, min_y) && has_many_siblings(other, min_x, min_y))
        || (has_many_siblings(img, max_x, max_y) && has_many_siblings(other, max_x, max_y))
}

/// Whether at least three neighbours of `(x, y)` share its exact colour
fn has_many_siblings(img: &Bitmap, x: u32, y: u32) -> bool {
    let (width, height) = img.dimensions();
    let (x0, y0, x2, y2, on_edge) = window(x, y, width, height);
    let center = img.get_pixel(x, y);

    let mut zeroes = usize::from(on_edge);
    for nx in x0..=x2 {
        for ny in y0..=y2 {
            if nx == x && ny == y {
                continue;
            }
            if img.get_pixel(nx, ny) == center {
                zeroes += 1;
            }
            if zeroes > 2 {
                return true;
            }
        }
    }
    false
}

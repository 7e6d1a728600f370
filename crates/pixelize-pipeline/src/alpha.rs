//! Alpha thresholding at source resolution.
//!
//! Every pixel is classified by its alpha channel before any resizing:
//! faint pixels are erased, nearly-opaque pixels are made fully opaque,
//! and everything in between is left alone so the nearest-neighbor
//! resize can still pick it up.

use image::Rgba;

use crate::types::RgbaImage;

/// Fully transparent pixel.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Fully opaque black pixel.
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Classify a single pixel against the alpha cutoffs.
///
/// The two checks run in sequence on the original alpha: a pixel below
/// `alpha_min` is cleared, then a pixel at or above `alpha_max` gets
/// alpha 255. With `alpha_min > alpha_max` both can fire, turning the
/// cleared pixel into opaque black.
#[must_use]
pub const fn threshold_pixel(pixel: Rgba<u8>, alpha_min: u8, alpha_max: u8) -> Rgba<u8> {
    let a = pixel.0[3];
    let mut out = if a < alpha_min { TRANSPARENT } else { pixel };
    if a >= alpha_max {
        out.0[3] = 255;
    }
    out
}

/// Counts of pixels rewritten by [`threshold`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThresholdCounts {
    /// Pixels forced to fully transparent.
    pub cleared: u64,
    /// Pixels whose alpha was raised to 255.
    pub made_opaque: u64,
}

/// Apply [`threshold_pixel`] to every pixel in place.
pub fn threshold(image: &mut RgbaImage, alpha_min: u8, alpha_max: u8) -> ThresholdCounts {
    let mut counts = ThresholdCounts::default();
    for pixel in image.pixels_mut() {
        let before = pixel.0[3];
        *pixel = threshold_pixel(*pixel, alpha_min, alpha_max);
        if before < alpha_min {
            counts.cleared += 1;
        }
        if before >= alpha_max && before < 255 {
            counts.made_opaque += 1;
        }
    }
    counts
}

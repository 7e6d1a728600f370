//! Second full-buffer sweep after posterization.
//!
//! Per pixel, in order:
//!
//! 1. alpha below [`TRANSPARENT_CUTOFF`]: cleared to fully transparent
//! 2. outline requested and the color is a dark near-gray: snapped to
//!    opaque black so it merges with the outline
//! 3. alpha at or above [`OPAQUE_CUTOFF`]: alpha raised to 255

use image::Rgba;

use crate::alpha::{BLACK, TRANSPARENT};
use crate::types::{OPAQUE_CUTOFF, RgbaImage};

/// Alpha below which a pixel is erased.
pub const TRANSPARENT_CUTOFF: u8 = 64;

/// Upper bound (exclusive) on both the gray spread and the distance
/// from black for a pixel to be treated as near-black.
pub const NEAR_BLACK_TOLERANCE: u32 = 64;

/// Whether `(r, g, b)` is close to gray and close to black.
///
/// Gray spread is `|r-g| + |g-b| + |b-r|`; darkness is the Euclidean
/// distance from `(0, 0, 0)`. Both must be below
/// [`NEAR_BLACK_TOLERANCE`].
#[must_use]
pub fn is_near_black(pixel: Rgba<u8>) -> bool {
    let [r, g, b, _] = pixel.0;
    let spread = u32::from(r.abs_diff(g)) + u32::from(g.abs_diff(b)) + u32::from(b.abs_diff(r));
    let distance_sq = [r, g, b]
        .iter()
        .map(|&c| u32::from(c) * u32::from(c))
        .sum::<u32>();
    spread < NEAR_BLACK_TOLERANCE && distance_sq < NEAR_BLACK_TOLERANCE * NEAR_BLACK_TOLERANCE
}

/// Clean up one pixel.
#[must_use]
pub fn cleanup_pixel(pixel: Rgba<u8>, border: bool) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    if a < TRANSPARENT_CUTOFF {
        TRANSPARENT
    } else if border && is_near_black(pixel) {
        BLACK
    } else if a >= OPAQUE_CUTOFF {
        Rgba([r, g, b, 255])
    } else {
        pixel
    }
}

/// Apply [`cleanup_pixel`] to every pixel in place.
pub fn cleanup(image: &mut RgbaImage, border: bool) {
    for pixel in image.pixels_mut() {
        *pixel = cleanup_pixel(*pixel, border);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faint_pixels_are_erased() {
        assert_eq!(cleanup_pixel(Rgba([200, 10, 10, 63]), false), TRANSPARENT);
        assert_eq!(cleanup_pixel(Rgba([0, 0, 0, 0]), true), TRANSPARENT);
    }

    #[test]
    fn mid_alpha_is_kept() {
        let px = Rgba([200, 10, 10, 64]);
        assert_eq!(cleanup_pixel(px, false), px);
        let px = Rgba([200, 10, 10, 189]);
        assert_eq!(cleanup_pixel(px, false), px);
    }

    #[test]
    fn high_alpha_becomes_opaque() {
        assert_eq!(
            cleanup_pixel(Rgba([200, 10, 10, 190]), false),
            Rgba([200, 10, 10, 255])
        );
    }

    #[test]
    fn near_black_snaps_only_with_border() {
        let dark = Rgba([32, 32, 32, 100]);
        assert_eq!(cleanup_pixel(dark, true), BLACK);
        assert_eq!(cleanup_pixel(dark, false), dark);
    }

    #[test]
    fn near_black_boundaries() {
        // Distance sqrt(3 * 32^2) ~= 55.4 < 64.
        assert!(is_near_black(Rgba([32, 32, 32, 255])));
        // Distance exactly 64 is not below the tolerance.
        assert!(!is_near_black(Rgba([64, 0, 0, 255])));
        // Spread |32-0| + |0-0| + |0-32| = 64 is not below the tolerance.
        assert!(!is_near_black(Rgba([32, 0, 0, 255])));
        // Dark but saturated: spread 60, distance 30.
        assert!(is_near_black(Rgba([30, 0, 0, 255])));
        assert!(is_near_black(Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn opacity_cutoff_ignores_configured_alpha_max() {
        // The cleanup cutoff is fixed; nothing here depends on config.
        assert_eq!(
            cleanup_pixel(Rgba([96, 96, 96, 189]), false),
            Rgba([96, 96, 96, 189])
        );
    }

    #[test]
    fn sweep_applies_to_all_pixels() {
        let mut img = RgbaImage::from_fn(3, 1, |x, _| {
            Rgba([128, 64, 32, [10, 100, 250][x as usize]])
        });
        cleanup(&mut img, false);
        assert_eq!(img.get_pixel(0, 0), &TRANSPARENT);
        assert_eq!(img.get_pixel(1, 0), &Rgba([128, 64, 32, 100]));
        assert_eq!(img.get_pixel(2, 0), &Rgba([128, 64, 32, 255]));
    }
}

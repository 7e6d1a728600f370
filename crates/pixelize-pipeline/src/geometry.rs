//! Target size resolution and margin compositing.
//!
//! The content is resized (nearest-neighbor, so every output pixel is a
//! copy of exactly one source pixel) into the area left after
//! subtracting the margin, then pasted centered onto a transparent
//! canvas of the full target size.

use image::imageops::{self, FilterType};

use crate::types::{Dimensions, PipelineError, RgbaImage};

/// Resolve the pre-scale canvas size from optional user hints.
///
/// - neither given: `default_size` × `default_size`
/// - only one given: the other is `requested * (source ratio)` with the
///   ratio computed in `f64` first, then truncated toward zero. This
///   can land one below the exact rational result (a 23x5 source at
///   height 100 gives width 459, not 460)
/// - both given: used as is, aspect ratio not preserved
///
/// `source` must have non-zero dimensions. The derived side may come
/// out as zero for extreme aspect ratios; [`inner_dimensions`] rejects
/// that.
#[must_use]
pub fn resolve_dimensions(
    source: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
    default_size: u32,
) -> Dimensions {
    // `as` saturates and truncates toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale_side = |side: u32, numerator: u32, denominator: u32| {
        let ratio = f64::from(numerator) / f64::from(denominator.max(1));
        (f64::from(side) * ratio) as u32
    };

    match (width, height) {
        (None, None) => Dimensions::new(default_size, default_size),
        (None, Some(h)) => Dimensions::new(scale_side(h, source.width, source.height), h),
        (Some(w), None) => Dimensions::new(w, scale_side(w, source.height, source.width)),
        (Some(w), Some(h)) => Dimensions::new(w, h),
    }
}

/// Size of the content area inside a `margin`-pixel frame.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimension`] if either side of the
/// content area would be zero or negative.
pub fn inner_dimensions(target: Dimensions, margin: u32) -> Result<Dimensions, PipelineError> {
    let inner_width = i64::from(target.width) - 2 * i64::from(margin);
    let inner_height = i64::from(target.height) - 2 * i64::from(margin);

    match (u32::try_from(inner_width), u32::try_from(inner_height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Dimensions::new(w, h)),
        _ => Err(PipelineError::InvalidDimension {
            width: inner_width,
            height: inner_height,
        }),
    }
}

/// Resize `content` into `inner` and paste it centered on a fully
/// transparent `target`-sized canvas.
///
/// The paste replaces canvas pixels outright; nothing is blended.
#[must_use]
pub fn composite(content: &RgbaImage, target: Dimensions, inner: Dimensions) -> RgbaImage {
    let resized = if Dimensions::of(content) == inner {
        content.clone()
    } else {
        imageops::resize(content, inner.width, inner.height, FilterType::Nearest)
    };

    let mut canvas = RgbaImage::new(target.width, target.height);
    let offset_x = (target.width - inner.width) / 2;
    let offset_y = (target.height - inner.height) / 2;
    imageops::replace(
        &mut canvas,
        &resized,
        i64::from(offset_x),
        i64::from(offset_y),
    );
    canvas
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    const SOURCE: Dimensions = Dimensions::new(64, 128);

    #[test]
    fn neither_hint_uses_default_size() {
        assert_eq!(
            resolve_dimensions(SOURCE, None, None, 32),
            Dimensions::new(32, 32)
        );
    }

    #[test]
    fn height_only_preserves_aspect() {
        assert_eq!(
            resolve_dimensions(SOURCE, None, Some(32), 32),
            Dimensions::new(16, 32)
        );
    }

    #[test]
    fn width_only_preserves_aspect() {
        assert_eq!(
            resolve_dimensions(SOURCE, Some(32), None, 32),
            Dimensions::new(32, 64)
        );
    }

    #[test]
    fn both_hints_are_taken_verbatim() {
        assert_eq!(
            resolve_dimensions(SOURCE, Some(10), Some(10), 32),
            Dimensions::new(10, 10)
        );
    }

    #[test]
    fn derived_side_truncates() {
        // 10 * 3 / 7 = 4.28..
        let source = Dimensions::new(3, 7);
        assert_eq!(
            resolve_dimensions(source, None, Some(10), 32),
            Dimensions::new(4, 10)
        );
    }

    #[test]
    fn derived_side_uses_float_ratio() {
        // 23 / 5 = 4.6 is not exact in f64; 100 * 4.6 lands just below 460.
        let source = Dimensions::new(23, 5);
        assert_eq!(
            resolve_dimensions(source, None, Some(100), 32),
            Dimensions::new(459, 100)
        );
    }

    #[test]
    fn inner_subtracts_margin_on_both_sides() {
        let inner = inner_dimensions(Dimensions::new(32, 20), 3).unwrap();
        assert_eq!(inner, Dimensions::new(26, 14));
    }

    #[test]
    fn inner_rejects_exhausted_area() {
        let result = inner_dimensions(Dimensions::new(10, 32), 5);
        assert!(matches!(
            result,
            Err(PipelineError::InvalidDimension {
                width: 0,
                height: 22
            })
        ));
        assert!(inner_dimensions(Dimensions::new(3, 3), 2).is_err());
    }

    #[test]
    fn inner_rejects_zero_target() {
        assert!(inner_dimensions(Dimensions::new(0, 5), 0).is_err());
    }

    #[test]
    fn composite_without_margin_is_plain_resize() {
        let img = RgbaImage::from_pixel(64, 64, Rgba([255, 0, 0, 255]));
        let out = composite(&img, Dimensions::new(32, 32), Dimensions::new(32, 32));
        assert_eq!(out.dimensions(), (32, 32));
        assert!(out.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn composite_centers_content_in_transparent_frame() {
        let img = RgbaImage::from_pixel(7, 7, Rgba([0, 255, 0, 255]));
        let out = composite(&img, Dimensions::new(10, 8), Dimensions::new(6, 4));
        assert_eq!(out.dimensions(), (10, 8));
        for (x, y, p) in out.enumerate_pixels() {
            let inside = (2..8).contains(&x) && (2..6).contains(&y);
            if inside {
                assert_eq!(p.0, [0, 255, 0, 255], "({x}, {y})");
            } else {
                assert_eq!(p.0, [0, 0, 0, 0], "({x}, {y})");
            }
        }
    }

    #[test]
    fn composite_keeps_hard_edges() {
        // Two-color source: every output pixel must be one of the two
        // source colors, never a blend.
        let img = RgbaImage::from_fn(9, 9, |x, _| {
            if x < 4 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let out = composite(&img, Dimensions::new(5, 5), Dimensions::new(5, 5));
        assert!(
            out.pixels()
                .all(|p| p.0 == [255, 255, 255, 255] || p.0 == [0, 0, 255, 255])
        );
    }
}

//! Bounding-box trimming to non-transparent content.

use crate::types::{PipelineError, RgbaImage};

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels (at least 1).
    pub width: u32,
    /// Height in pixels (at least 1).
    pub height: u32,
}

/// Smallest rectangle enclosing every pixel with non-zero alpha, or
/// `None` if the image is fully transparent.
#[must_use]
pub fn content_bounds(image: &RgbaImage) -> Option<Bounds> {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut found = false;

    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] > 0 {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    found.then(|| Bounds {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop `image` to its [`content_bounds`].
///
/// Returns the image unchanged (no copy) when the content already fills
/// it.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyContent`] if every pixel is fully
/// transparent.
pub fn trim(image: RgbaImage) -> Result<(RgbaImage, Bounds), PipelineError> {
    let bounds = content_bounds(&image).ok_or(PipelineError::EmptyContent)?;
    if (bounds.width, bounds.height) == image.dimensions() {
        return Ok((image, bounds));
    }
    let cropped =
        image::imageops::crop_imm(&image, bounds.x, bounds.y, bounds.width, bounds.height)
            .to_image();
    Ok((cropped, bounds))
}

//! Silhouette outline: a one-pixel black border around visible content.
//!
//! A fully transparent pixel is painted opaque black when at least one
//! of its four axis-aligned neighbors is visible and not already pure
//! black. Diagonals are ignored. Edges that are already black get no
//! second ring.
//!
//! Neighbors are read from the input snapshot, so freshly painted
//! outline pixels never seed further outline pixels.

use crate::alpha::BLACK;
use crate::types::RgbaImage;

/// In-bounds 4-neighbors of `(x, y)`: up, down, left, right.
pub(crate) fn neighbors(x: u32, y: u32, width: u32, height: u32) -> [Option<(u32, u32)>; 4] {
    [
        y.checked_sub(1).map(|ny| (x, ny)),
        (y + 1 < height).then(|| (x, y + 1)),
        x.checked_sub(1).map(|nx| (nx, y)),
        (x + 1 < width).then(|| (x + 1, y)),
    ]
}

/// Whether the transparent pixel at `(x, y)` belongs to the outline.
#[must_use]
pub fn is_outline(image: &RgbaImage, x: u32, y: u32) -> bool {
    if image.get_pixel(x, y).0[3] != 0 {
        return false;
    }
    let (width, height) = image.dimensions();
    neighbors(x, y, width, height)
        .into_iter()
        .flatten()
        .map(|(nx, ny)| *image.get_pixel(nx, ny))
        .any(|p| p.0[3] != 0 && p != BLACK)
}

/// Paint the outline. Returns the new image and the number of pixels
/// painted.
#[must_use]
pub fn outline(image: &RgbaImage) -> (RgbaImage, u64) {
    let mut painted = 0;
    let out = RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        if is_outline(image, x, y) {
            painted += 1;
            BLACK
        } else {
            *image.get_pixel(x, y)
        }
    });
    (out, painted)
}

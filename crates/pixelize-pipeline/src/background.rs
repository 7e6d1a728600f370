//! Background removal: isolate the foreground before thresholding.
//!
//! This module defines the [`BackgroundRemover`] trait for pluggable
//! foreground isolation and the [`BackgroundRemoverKind`] enum for the
//! strategies that ship with the crate.
//!
//! # Strategy pattern
//!
//! The pipeline only relies on the buffer contract: a remover receives
//! the decoded image and returns an image of identical dimensions in
//! which background pixels have been driven toward transparency. A
//! segmentation model living outside this crate can be plugged in by
//! implementing the trait.

use std::collections::{HashMap, VecDeque};

use image::Rgba;

use crate::types::{PipelineError, RgbaImage};

/// Selects which built-in background removal strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRemoverKind {
    /// Flood fill from the image border through pixels close to the
    /// dominant border colors.
    ///
    /// Works well for sprites and product shots on a flat or lightly
    /// textured backdrop. Content touching the border in a background
    /// color is removed too.
    #[default]
    EdgeFlood,
}

/// Trait for background removal strategies.
pub trait BackgroundRemover {
    /// Remove the background of `image`.
    ///
    /// The returned image must have the same dimensions as the input.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BackgroundRemoval`] if the strategy
    /// cannot process the image.
    fn remove(&self, image: RgbaImage) -> Result<RgbaImage, PipelineError>;
}

impl BackgroundRemover for BackgroundRemoverKind {
    fn remove(&self, image: RgbaImage) -> Result<RgbaImage, PipelineError> {
        match *self {
            Self::EdgeFlood => Ok(edge_flood(image)),
        }
    }
}

/// Width of the border band sampled for background colors.
const SAMPLE_BAND: u32 = 5;

/// How many dominant border colors count as background.
const MAX_BACKGROUND_COLORS: usize = 3;

/// Maximum sum of absolute RGB differences to a background color.
const TOLERANCE: u32 = 30;

/// Clear every pixel reachable from the border through background-colored
/// pixels.
fn edge_flood(mut image: RgbaImage) -> RgbaImage {
    let (width, height) = image.dimensions();
    let backgrounds = dominant_border_colors(&image);
    if backgrounds.is_empty() {
        return image;
    }

    let is_background = |p: &Rgba<u8>| {
        p.0[3] == 0
            || backgrounds
                .iter()
                .any(|bg| rgb_distance([p.0[0], p.0[1], p.0[2]], *bg) <= TOLERANCE)
    };

    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let mut visited = vec![false; width as usize * height as usize];
    let mut queue = VecDeque::new();

    for (x, y) in border_coordinates(width, height) {
        if !visited[index(x, y)] && is_background(image.get_pixel(x, y)) {
            visited[index(x, y)] = true;
            queue.push_back((x, y));
        }
    }

    let mut removed = 0u64;
    while let Some((x, y)) = queue.pop_front() {
        let pixel = image.get_pixel_mut(x, y);
        pixel.0[3] = 0;
        removed += 1;

        for (nx, ny) in crate::outline::neighbors(x, y, width, height).into_iter().flatten() {
            if !visited[index(nx, ny)] && is_background(image.get_pixel(nx, ny)) {
                visited[index(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    log::debug!(
        "edge flood cleared {removed} background pixels using {} border colors",
        backgrounds.len(),
    );
    image
}

/// Most common colors in the border band, bucketed to 16 levels per
/// channel so minor noise does not split a flat backdrop.
fn dominant_border_colors(image: &RgbaImage) -> Vec<[u8; 3]> {
    let (width, height) = image.dimensions();
    let band = SAMPLE_BAND.min(width).min(height);
    let mut counts: HashMap<[u8; 3], usize> = HashMap::new();

    for (x, y, pixel) in image.enumerate_pixels() {
        let in_band = x < band || y < band || x >= width - band || y >= height - band;
        if !in_band || pixel.0[3] == 0 {
            continue;
        }
        let bucket = [pixel.0[0] & 0xF0, pixel.0[1] & 0xF0, pixel.0[2] & 0xF0];
        *counts.entry(bucket).or_insert(0) += 1;
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(MAX_BACKGROUND_COLORS)
        .map(|(color, _)| bucket_center(color))
        .collect()
}

/// Middle of a 16-wide bucket.
const fn bucket_center(color: [u8; 3]) -> [u8; 3] {
    [color[0] | 0x08, color[1] | 0x08, color[2] | 0x08]
}

/// Sum of absolute per-channel differences.
fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| u32::from(x.abs_diff(y)))
        .sum()
}

/// Coordinates of the outermost ring of pixels.
fn border_coordinates(width: u32, height: u32) -> impl Iterator<Item = (u32, u32)> {
    let top_bottom = (0..width).flat_map(move |x| [(x, 0), (x, height - 1)]);
    let left_right = (0..height).flat_map(move |y| [(0, y), (width - 1, y)]);
    top_bottom.chain(left_right)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// A red square on a flat light-gray backdrop.
    fn sprite_on_backdrop(size: u32, inset: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            let inside = (inset..size - inset).contains(&x) && (inset..size - inset).contains(&y);
            if inside {
                Rgba([220, 20, 20, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        })
    }

    #[test]
    fn default_is_edge_flood() {
        assert_eq!(
            BackgroundRemoverKind::default(),
            BackgroundRemoverKind::EdgeFlood
        );
    }

    #[test]
    fn flat_backdrop_is_cleared() {
        let img = sprite_on_backdrop(20, 6);
        let out = BackgroundRemoverKind::EdgeFlood.remove(img).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(5, 10).0[3], 0);
        assert_eq!(out.get_pixel(10, 10), &Rgba([220, 20, 20, 255]));
        let opaque = out.pixels().filter(|p| p.0[3] > 0).count();
        assert_eq!(opaque, 8 * 8);
    }

    #[test]
    fn enclosed_background_color_survives() {
        // A backdrop-colored hole inside the sprite is not reachable
        // from the border and stays opaque.
        let mut img = sprite_on_backdrop(20, 4);
        img.put_pixel(10, 10, Rgba([200, 200, 200, 255]));
        let out = BackgroundRemoverKind::EdgeFlood.remove(img).unwrap();
        assert_eq!(out.get_pixel(10, 10).0[3], 255);
    }

    #[test]
    fn fully_transparent_image_is_unchanged() {
        let img = RgbaImage::new(6, 6);
        let out = BackgroundRemoverKind::EdgeFlood.remove(img.clone()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn single_pixel_image() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([5, 5, 5, 255]));
        let out = BackgroundRemoverKind::EdgeFlood.remove(img).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn custom_remover_can_be_plugged_in() {
        struct Identity;
        impl BackgroundRemover for Identity {
            fn remove(&self, image: RgbaImage) -> Result<RgbaImage, PipelineError> {
                Ok(image)
            }
        }
        let img = sprite_on_backdrop(8, 2);
        assert_eq!(Identity.remove(img.clone()).unwrap(), img);
    }
}

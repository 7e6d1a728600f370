//! Palette reduction to an indexed-color image.
//!
//! Pixel art produced by the pipeline usually has only a handful of
//! colors, in which case the palette is exact. Images with more than
//! 256 distinct RGBA values fall back to an adaptive NeuQuant palette.

use std::collections::HashMap;

use color_quant::NeuQuant;
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::types::RgbaImage;

/// Largest palette an indexed image can carry.
pub const MAX_COLORS: usize = 256;

/// NeuQuant sampling factor: 1 is slowest/best, 30 fastest.
const SAMPLE_FACTOR: i32 = 10;

/// An image stored as palette indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA palette entries, at most [`MAX_COLORS`].
    pub palette: Vec<[u8; 4]>,
    /// One palette index per pixel, row-major.
    pub indices: Vec<u8>,
}

impl IndexedImage {
    /// Expand back to RGBA.
    ///
    /// Indices past the end of the palette decode as transparent.
    #[must_use]
    pub fn to_rgba(&self) -> RgbaImage {
        let transparent = [0, 0, 0, 0];
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let i = y as usize * self.width as usize + x as usize;
            let entry = self
                .indices
                .get(i)
                .and_then(|&idx| self.palette.get(usize::from(idx)))
                .unwrap_or(&transparent);
            Rgba(*entry)
        })
    }
}

/// How the palette was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteMethod {
    /// Every distinct color got its own entry; no information lost.
    Exact,
    /// NeuQuant approximation of a larger color set.
    NeuQuant,
}

/// Reduce `image` to at most [`MAX_COLORS`] palette entries.
#[must_use]
pub fn reduce_palette(image: &RgbaImage) -> (IndexedImage, PaletteMethod) {
    exact_palette(image).map_or_else(
        || (neuquant_palette(image), PaletteMethod::NeuQuant),
        |indexed| (indexed, PaletteMethod::Exact),
    )
}

/// Palette in first-seen order, or `None` if there are too many colors.
fn exact_palette(image: &RgbaImage) -> Option<IndexedImage> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(image.as_raw().len() / 4);

    for pixel in image.pixels() {
        let index = match lookup.get(&pixel.0) {
            Some(&index) => index,
            None => {
                let index = u8::try_from(palette.len()).ok()?;
                palette.push(pixel.0);
                lookup.insert(pixel.0, index);
                index
            }
        };
        indices.push(index);
    }

    Some(IndexedImage {
        width: image.width(),
        height: image.height(),
        palette,
        indices,
    })
}

fn neuquant_palette(image: &RgbaImage) -> IndexedImage {
    let quant = NeuQuant::new(SAMPLE_FACTOR, MAX_COLORS, image.as_raw());
    let palette = quant
        .color_map_rgba()
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();

    // `index_of` never exceeds the requested color count.
    #[allow(clippy::cast_possible_truncation)]
    let indices = image
        .pixels()
        .map(|p| quant.index_of(&p.0) as u8)
        .collect();

    IndexedImage {
        width: image.width(),
        height: image.height(),
        palette,
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn few_colors_are_exact() {
        let img = RgbaImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                Rgba([224, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let (indexed, method) = reduce_palette(&img);
        assert_eq!(method, PaletteMethod::Exact);
        assert_eq!(indexed.palette, vec![[224, 0, 0, 255], [0, 0, 0, 0]]);
        assert_eq!(indexed.indices.len(), 64);
        assert_eq!(indexed.to_rgba(), img);
    }

    #[test]
    fn exactly_256_colors_stay_exact() {
        let img = RgbaImage::from_fn(16, 16, |x, y| Rgba([(y * 16 + x) as u8, 0, 0, 255]));
        let (indexed, method) = reduce_palette(&img);
        assert_eq!(method, PaletteMethod::Exact);
        assert_eq!(indexed.palette.len(), 256);
        assert_eq!(indexed.to_rgba(), img);
    }

    #[test]
    fn many_colors_use_neuquant() {
        let img = RgbaImage::from_fn(32, 32, |x, y| {
            Rgba([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8, 255])
        });
        let (indexed, method) = reduce_palette(&img);
        assert_eq!(method, PaletteMethod::NeuQuant);
        assert!(indexed.palette.len() <= MAX_COLORS);
        assert_eq!(indexed.indices.len(), 32 * 32);
        assert!(
            indexed
                .indices
                .iter()
                .all(|&i| usize::from(i) < indexed.palette.len())
        );
        assert_eq!(indexed.to_rgba().dimensions(), (32, 32));
    }

    #[test]
    fn out_of_range_index_decodes_transparent() {
        let indexed = IndexedImage {
            width: 1,
            height: 1,
            palette: vec![],
            indices: vec![3],
        };
        assert_eq!(indexed.to_rgba().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }
}

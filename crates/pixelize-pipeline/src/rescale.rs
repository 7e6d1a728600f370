//! Final integer upscale and optional crop.

use crate::crop_box::CropBox;
use crate::types::{PipelineError, RgbaImage};

/// Nearest-neighbor upscale by an integer factor on both axes.
///
/// Each source pixel becomes a `scale`×`scale` block.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `scale` is zero or the
/// scaled size does not fit in `u32`.
pub fn upscale(image: &RgbaImage, scale: u32) -> Result<RgbaImage, PipelineError> {
    if scale == 0 {
        return Err(PipelineError::InvalidConfig(
            "scale must be at least 1".to_owned(),
        ));
    }
    if scale == 1 {
        return Ok(image.clone());
    }
    let too_large = || {
        PipelineError::InvalidConfig(format!(
            "scaling {}x{} by {scale} overflows",
            image.width(),
            image.height(),
        ))
    };
    let width = image.width().checked_mul(scale).ok_or_else(too_large)?;
    let height = image.height().checked_mul(scale).ok_or_else(too_large)?;

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        *image.get_pixel(x / scale, y / scale)
    }))
}

/// Cut `crop` out of `image`.
///
/// # Errors
///
/// Returns [`PipelineError::CropOutOfBounds`] if the rectangle is empty
/// or extends past the right or bottom edge.
pub fn crop(image: &RgbaImage, crop: CropBox) -> Result<RgbaImage, PipelineError> {
    let (width, height) = image.dimensions();
    let fits = crop.width > 0
        && crop.height > 0
        && crop.right().is_some_and(|r| r <= width)
        && crop.bottom().is_some_and(|b| b <= height);
    if !fits {
        return Err(PipelineError::CropOutOfBounds {
            crop,
            width,
            height,
        });
    }
    Ok(image::imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgba;

    use super::*;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }

    #[test]
    fn upscale_replicates_blocks() {
        let img = checker(3, 2);
        let out = upscale(&img, 2).unwrap();
        assert_eq!(out.dimensions(), (6, 4));
        for (x, y, p) in out.enumerate_pixels() {
            assert_eq!(p, img.get_pixel(x / 2, y / 2));
        }
    }

    #[test]
    fn scale_one_is_identity() {
        let img = checker(5, 5);
        assert_eq!(upscale(&img, 1).unwrap(), img);
    }

    #[test]
    fn scale_zero_is_rejected() {
        assert!(matches!(
            upscale(&checker(2, 2), 0),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn scale_overflow_is_rejected() {
        assert!(upscale(&checker(2, 2), u32::MAX).is_err());
    }

    #[test]
    fn crop_extracts_window() {
        let img = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let out = crop(&img, CropBox::new(3, 2, 4, 5)).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.get_pixel(0, 0), &Rgba([4, 5, 0, 255]));
        assert_eq!(out.get_pixel(2, 1), &Rgba([6, 6, 0, 255]));
    }

    #[test]
    fn crop_touching_edges_is_allowed() {
        let img = checker(10, 10);
        assert_eq!(crop(&img, CropBox::new(10, 10, 0, 0)).unwrap(), img);
        assert!(crop(&img, CropBox::new(1, 1, 9, 9)).is_ok());
    }

    #[test]
    fn crop_past_edges_fails() {
        let img = checker(10, 10);
        for bad in [
            CropBox::new(11, 1, 0, 0),
            CropBox::new(1, 1, 10, 0),
            CropBox::new(5, 5, 6, 0),
            CropBox::new(5, 5, 0, 6),
            CropBox::new(u32::MAX, 1, 1, 0),
        ] {
            assert!(
                matches!(
                    crop(&img, bad),
                    Err(PipelineError::CropOutOfBounds { .. })
                ),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn empty_crop_fails() {
        let img = checker(4, 4);
        assert!(crop(&img, CropBox::new(0, 2, 0, 0)).is_err());
    }
}

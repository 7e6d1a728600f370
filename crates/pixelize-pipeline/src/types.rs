//! Shared types for the pixelize pipeline.

use serde::{Deserialize, Serialize};

use crate::crop_box::CropBox;
use crate::palette::IndexedImage;

/// Re-export `RgbaImage` so downstream crates can hand pre-decoded
/// images to the pipeline without depending on `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbaImage) -> Self {
        Self::new(image.width(), image.height())
    }

    /// Total number of pixels.
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Where the pipeline gets its pixels from.
///
/// Paths and streams are resolved into one of these variants by the I/O
/// layer; the pipeline itself never touches the filesystem.
#[derive(Debug, Clone)]
pub enum Source {
    /// Encoded image bytes (PNG, JPEG, BMP, GIF, WebP).
    Encoded(Vec<u8>),
    /// An image that is already decoded.
    Decoded(RgbaImage),
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Encoded(bytes)
    }
}

impl From<RgbaImage> for Source {
    fn from(image: RgbaImage) -> Self {
        Self::Decoded(image)
    }
}

/// Alpha at or above which the cleanup pass forces full opacity.
///
/// This is the same value as [`PixelizeConfig::DEFAULT_ALPHA_MAX`] but is
/// deliberately not tied to the configured `alpha_max`: only the first
/// thresholding pass honours the caller's cutoff.
pub const OPAQUE_CUTOFF: u8 = 190;

/// Configuration for the pixelize pipeline.
///
/// Every field has a default matching the `DEFAULT_*` constants.
/// Fields are public; [`validate`](Self::validate) checks the few
/// values that cannot be handled at all (a zero scale).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelizeConfig {
    /// Isolate the foreground with a background remover before
    /// thresholding.
    pub rembg: bool,

    /// Trim the image to the bounding box of its non-transparent
    /// content before resizing.
    pub inner: bool,

    /// Posterization exponent: RGB channels are floored to multiples of
    /// `2^color_reduction`. `0` disables posterization.
    pub color_reduction: u8,

    /// Pixels with alpha below this become fully transparent.
    pub alpha_min: u8,

    /// Pixels with alpha at or above this become fully opaque.
    pub alpha_max: u8,

    /// Transparent padding around the content, in pre-scale pixels.
    pub margin: u32,

    /// Draw a one-pixel black outline around the silhouette. Reserves
    /// one extra pixel of margin on every side.
    pub border: bool,

    /// Target width before scaling. Derived from `height` (or the
    /// default size) when absent.
    pub width: Option<u32>,

    /// Target height before scaling. Derived from `width` (or the
    /// default size) when absent.
    pub height: Option<u32>,

    /// Integer nearest-neighbor upscale factor applied last.
    pub scale: u32,

    /// Optional crop rectangle applied after scaling.
    pub crop: Option<CropBox>,
}

impl PixelizeConfig {
    /// Default posterization exponent.
    pub const DEFAULT_COLOR_REDUCTION: u8 = 5;
    /// Default transparency cutoff.
    pub const DEFAULT_ALPHA_MIN: u8 = 190;
    /// Default opacity cutoff.
    pub const DEFAULT_ALPHA_MAX: u8 = OPAQUE_CUTOFF;
    /// Default margin.
    pub const DEFAULT_MARGIN: u32 = 0;
    /// Default upscale factor.
    pub const DEFAULT_SCALE: u32 = 2;
    /// Target edge length used when neither width nor height is given.
    pub const DEFAULT_SIZE: u32 = 32;

    /// Margin actually reserved around the content: the configured
    /// margin plus one pixel for the outline when `border` is set.
    #[must_use]
    pub const fn effective_margin(&self) -> u32 {
        if self.border {
            self.margin.saturating_add(1)
        } else {
            self.margin
        }
    }

    /// Reject configurations the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `scale` is zero or a
    /// requested width or height is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.scale == 0 {
            return Err(PipelineError::InvalidConfig(
                "scale must be at least 1".to_owned(),
            ));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "width and height must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for PixelizeConfig {
    fn default() -> Self {
        Self {
            rembg: false,
            inner: false,
            color_reduction: Self::DEFAULT_COLOR_REDUCTION,
            alpha_min: Self::DEFAULT_ALPHA_MIN,
            alpha_max: Self::DEFAULT_ALPHA_MAX,
            margin: Self::DEFAULT_MARGIN,
            border: false,
            width: None,
            height: None,
            scale: Self::DEFAULT_SCALE,
            crop: None,
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone)]
pub struct PixelizeResult {
    /// Final RGBA image (after scaling and cropping).
    pub image: RgbaImage,

    /// The same image reduced to an adaptive palette of at most 256
    /// colors, ready for encoding.
    pub indexed: IndexedImage,

    /// Resolved pre-scale canvas size (target width and height).
    pub target: Dimensions,
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The content area left after subtracting the margin is empty.
    #[error("content area {width}x{height} is empty; margin too large for the target size")]
    InvalidDimension {
        /// Inner width (target width minus twice the margin).
        width: i64,
        /// Inner height (target height minus twice the margin).
        height: i64,
    },

    /// Trimming was requested but every pixel is transparent.
    #[error("cannot trim: image has no non-transparent content")]
    EmptyContent,

    /// The crop rectangle does not fit inside the rescaled image.
    #[error("crop box {crop} lies outside the {width}x{height} image")]
    CropOutOfBounds {
        /// The requested crop.
        crop: CropBox,
        /// Width of the image being cropped.
        width: u32,
        /// Height of the image being cropped.
        height: u32,
    },

    /// The background remover failed.
    #[error("background removal failed: {0}")]
    BackgroundRemoval(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = PixelizeConfig::default();
        assert!(!config.rembg);
        assert!(!config.inner);
        assert_eq!(config.color_reduction, 5);
        assert_eq!(config.alpha_min, 190);
        assert_eq!(config.alpha_max, 190);
        assert_eq!(config.margin, 0);
        assert!(!config.border);
        assert_eq!(config.width, None);
        assert_eq!(config.height, None);
        assert_eq!(config.scale, 2);
        assert_eq!(config.crop, None);
    }

    #[test]
    fn border_adds_one_to_margin() {
        let config = PixelizeConfig {
            border: true,
            ..PixelizeConfig::default()
        };
        assert_eq!(config.effective_margin(), 1);

        let config = PixelizeConfig {
            border: true,
            margin: 3,
            ..PixelizeConfig::default()
        };
        assert_eq!(config.effective_margin(), 4);
    }

    #[test]
    fn validate_rejects_zero_scale() {
        let config = PixelizeConfig {
            scale: 0,
            ..PixelizeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_size() {
        let config = PixelizeConfig {
            width: Some(0),
            ..PixelizeConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PixelizeConfig::default().validate().is_ok());
    }

    #[test]
    fn config_json_round_trip() {
        let config = PixelizeConfig {
            border: true,
            height: Some(32),
            crop: Some(CropBox::new(10, 10, 2, 2)),
            ..PixelizeConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: PixelizeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: PixelizeConfig = serde_json::from_str(r#"{"height": 16}"#).unwrap();
        assert_eq!(config.height, Some(16));
        assert_eq!(config.scale, PixelizeConfig::DEFAULT_SCALE);
    }

    #[test]
    fn pixel_count_does_not_overflow() {
        let dims = Dimensions::new(u32::MAX, 2);
        assert_eq!(dims.pixel_count(), u64::from(u32::MAX) * 2);
    }
}

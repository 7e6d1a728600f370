//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use pixelize_pipeline::{BackgroundRemoverKind, Pipeline, PixelizeConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let result = Pipeline::new(png, PixelizeConfig::default())
//!     .decode()?
//!     .remove_background(&BackgroundRemoverKind::default())?
//!     .threshold()
//!     .trim()?
//!     .composite()?
//!     .posterize()
//!     .cleanup()
//!     .outline()
//!     .rescale()?
//!     .crop()?
//!     .reduce_palette()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next state (or
//! `Result` for fallible stages). Optional stages (background removal,
//! trim, outline, crop) always exist in the chain and pass the buffer
//! through untouched when the config does not enable them, so skipping
//! or reordering stages is a compile-time error.

use crate::background::BackgroundRemover;
use crate::palette::{IndexedImage, PaletteMethod};
use crate::trim::Bounds;
use crate::types::{Dimensions, PipelineError, PixelizeConfig, PixelizeResult, RgbaImage, Source};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing — call .decode() to continue"]
pub struct Pending {
    config: PixelizeConfig,
    source: Source,
}

impl Pending {
    /// The source the pipeline will decode.
    pub const fn source(&self) -> &Source {
        &self.source
    }

    /// Validate the config, decode the source and advance to
    /// [`Decoded`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an unusable config,
    /// [`PipelineError::EmptyInput`] for empty input and
    /// [`PipelineError::ImageDecode`] for undecodable bytes.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let source_len = match &self.source {
            Source::Encoded(bytes) => Some(bytes.len()),
            Source::Decoded(_) => None,
        };
        let image = crate::decode::resolve(self.source)?;
        log::debug!("decoded {}x{} source", image.width(), image.height());
        Ok(Decoded {
            config: self.config,
            image,
            source_len,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state after decoding to RGBA.
#[must_use = "pipeline stages are consumed by advancing — call .remove_background() to continue"]
pub struct Decoded {
    config: PixelizeConfig,
    image: RgbaImage,
    source_len: Option<usize>,
}

impl Decoded {
    /// The decoded RGBA image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Length of the encoded input, or `None` for a pre-decoded source.
    #[must_use]
    pub const fn source_len(&self) -> Option<usize> {
        self.source_len
    }

    /// Run `remover` if `config.rembg` is set and advance to
    /// [`Isolated`].
    ///
    /// # Errors
    ///
    /// Propagates the remover's error, and returns
    /// [`PipelineError::BackgroundRemoval`] if it changed the image
    /// dimensions.
    pub fn remove_background(
        self,
        remover: &dyn BackgroundRemover,
    ) -> Result<Isolated, PipelineError> {
        if !self.config.rembg {
            return Ok(Isolated {
                config: self.config,
                image: self.image,
                applied: false,
            });
        }

        let before = Dimensions::of(&self.image);
        let image = remover.remove(self.image)?;
        let after = Dimensions::of(&image);
        if before != after {
            return Err(PipelineError::BackgroundRemoval(format!(
                "remover changed dimensions from {}x{} to {}x{}",
                before.width, before.height, after.width, after.height,
            )));
        }
        log::debug!("background removed");
        Ok(Isolated {
            config: self.config,
            image,
            applied: true,
        })
    }
}

// ───────────────────────── Stage 2: Isolated ─────────────────────────

/// Pipeline state after optional background removal.
#[must_use = "pipeline stages are consumed by advancing — call .threshold() to continue"]
pub struct Isolated {
    config: PixelizeConfig,
    image: RgbaImage,
    applied: bool,
}

impl Isolated {
    /// The (possibly) foreground-isolated image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether background removal actually ran.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Apply the alpha cutoffs at source resolution.
    pub fn threshold(mut self) -> Thresholded {
        let counts = crate::alpha::threshold(
            &mut self.image,
            self.config.alpha_min,
            self.config.alpha_max,
        );
        log::debug!(
            "threshold: {} cleared, {} made opaque",
            counts.cleared,
            counts.made_opaque,
        );
        Thresholded {
            config: self.config,
            image: self.image,
            counts,
        }
    }
}

// ───────────────────────── Stage 3: Thresholded ──────────────────────

/// Pipeline state after alpha thresholding.
#[must_use = "pipeline stages are consumed by advancing — call .trim() to continue"]
pub struct Thresholded {
    config: PixelizeConfig,
    image: RgbaImage,
    counts: crate::alpha::ThresholdCounts,
}

impl Thresholded {
    /// The thresholded image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// How many pixels the threshold rewrote.
    #[must_use]
    pub const fn counts(&self) -> crate::alpha::ThresholdCounts {
        self.counts
    }

    /// Trim to the content bounding box if `config.inner` is set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyContent`] if trimming is requested
    /// and nothing is left visible after thresholding.
    pub fn trim(self) -> Result<Trimmed, PipelineError> {
        if !self.config.inner {
            return Ok(Trimmed {
                config: self.config,
                image: self.image,
                bounds: None,
            });
        }
        let (image, bounds) = crate::trim::trim(self.image)?;
        log::debug!(
            "trimmed to {}x{} at ({}, {})",
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y,
        );
        Ok(Trimmed {
            config: self.config,
            image,
            bounds: Some(bounds),
        })
    }
}

// ───────────────────────── Stage 4: Trimmed ──────────────────────────

/// Pipeline state after optional trimming.
#[must_use = "pipeline stages are consumed by advancing — call .composite() to continue"]
pub struct Trimmed {
    config: PixelizeConfig,
    image: RgbaImage,
    bounds: Option<Bounds>,
}

impl Trimmed {
    /// The (possibly) trimmed image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Content bounds in the thresholded image, when trimming ran.
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Resolve the target size, resize the content into the area inside
    /// the margin and paste it onto a transparent canvas.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimension`] if the margin leaves
    /// no room for content.
    pub fn composite(self) -> Result<Composited, PipelineError> {
        let target = crate::geometry::resolve_dimensions(
            Dimensions::of(&self.image),
            self.config.width,
            self.config.height,
            PixelizeConfig::DEFAULT_SIZE,
        );
        let inner = crate::geometry::inner_dimensions(target, self.config.effective_margin())?;
        let image = crate::geometry::composite(&self.image, target, inner);
        log::debug!(
            "composited {}x{} content onto {}x{} canvas",
            inner.width,
            inner.height,
            target.width,
            target.height,
        );
        Ok(Composited {
            config: self.config,
            image,
            target,
            inner,
        })
    }
}

// ───────────────────────── Stage 5: Composited ───────────────────────

/// Pipeline state after resizing onto the target canvas.
#[must_use = "pipeline stages are consumed by advancing — call .posterize() to continue"]
pub struct Composited {
    config: PixelizeConfig,
    image: RgbaImage,
    target: Dimensions,
    inner: Dimensions,
}

impl Composited {
    /// The target-sized canvas.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Resolved canvas size.
    #[must_use]
    pub const fn target(&self) -> Dimensions {
        self.target
    }

    /// Size of the content area inside the margin.
    #[must_use]
    pub const fn inner(&self) -> Dimensions {
        self.inner
    }

    /// Floor RGB channels to `2^color_reduction` buckets.
    pub fn posterize(mut self) -> Posterized {
        crate::posterize::posterize(&mut self.image, self.config.color_reduction);
        Posterized {
            config: self.config,
            image: self.image,
            target: self.target,
        }
    }
}

// ───────────────────────── Stage 6: Posterized ───────────────────────

/// Pipeline state after posterization.
#[must_use = "pipeline stages are consumed by advancing — call .cleanup() to continue"]
pub struct Posterized {
    config: PixelizeConfig,
    image: RgbaImage,
    target: Dimensions,
}

impl Posterized {
    /// The posterized canvas.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Snap faint pixels to transparent, dark grays to black (when an
    /// outline is requested) and strong alpha to opaque.
    pub fn cleanup(mut self) -> Cleaned {
        crate::cleanup::cleanup(&mut self.image, self.config.border);
        Cleaned {
            config: self.config,
            image: self.image,
            target: self.target,
        }
    }
}

// ───────────────────────── Stage 7: Cleaned ──────────────────────────

/// Pipeline state after the cleanup sweep.
#[must_use = "pipeline stages are consumed by advancing — call .outline() to continue"]
pub struct Cleaned {
    config: PixelizeConfig,
    image: RgbaImage,
    target: Dimensions,
}

impl Cleaned {
    /// The cleaned canvas.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Paint the silhouette outline if `config.border` is set.
    pub fn outline(self) -> Outlined {
        if !self.config.border {
            return Outlined {
                config: self.config,
                image: self.image,
                target: self.target,
                painted: None,
            };
        }
        let (image, painted) = crate::outline::outline(&self.image);
        log::debug!("outline painted {painted} pixels");
        Outlined {
            config: self.config,
            image,
            target: self.target,
            painted: Some(painted),
        }
    }
}

// ───────────────────────── Stage 8: Outlined ─────────────────────────

/// Pipeline state after optional outline synthesis.
#[must_use = "pipeline stages are consumed by advancing — call .rescale() to continue"]
pub struct Outlined {
    config: PixelizeConfig,
    image: RgbaImage,
    target: Dimensions,
    painted: Option<u64>,
}

impl Outlined {
    /// The outlined canvas (pre-scale).
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Number of outline pixels painted, or `None` if the outline stage
    /// was disabled.
    #[must_use]
    pub const fn painted(&self) -> Option<u64> {
        self.painted
    }

    /// Upscale by `config.scale`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the scaled size
    /// overflows.
    pub fn rescale(self) -> Result<Rescaled, PipelineError> {
        let image = crate::rescale::upscale(&self.image, self.config.scale)?;
        log::debug!(
            "rescaled x{} to {}x{}",
            self.config.scale,
            image.width(),
            image.height(),
        );
        Ok(Rescaled {
            config: self.config,
            image,
            target: self.target,
        })
    }
}

// ───────────────────────── Stage 9: Rescaled ─────────────────────────

/// Pipeline state after the final upscale.
#[must_use = "pipeline stages are consumed by advancing — call .crop() to continue"]
pub struct Rescaled {
    config: PixelizeConfig,
    image: RgbaImage,
    target: Dimensions,
}

impl Rescaled {
    /// The upscaled image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Crop to `config.crop` if set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CropOutOfBounds`] if the crop does not
    /// fit.
    pub fn crop(self) -> Result<Cropped, PipelineError> {
        let Some(crop) = self.config.crop else {
            return Ok(Cropped {
                image: self.image,
                target: self.target,
                applied: false,
            });
        };
        let image = crate::rescale::crop(&self.image, crop)?;
        log::debug!("cropped to {crop}");
        Ok(Cropped {
            image,
            target: self.target,
            applied: true,
        })
    }
}

// ───────────────────────── Stage 10: Cropped ─────────────────────────

/// Pipeline state after the optional crop. This is the final RGBA image.
#[must_use = "pipeline stages are consumed by advancing — call .reduce_palette() to continue"]
pub struct Cropped {
    image: RgbaImage,
    target: Dimensions,
    applied: bool,
}

impl Cropped {
    /// The final RGBA image.
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether a crop was applied.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// Reduce to an indexed palette of at most 256 colors.
    pub fn reduce_palette(self) -> Reduced {
        let (indexed, method) = crate::palette::reduce_palette(&self.image);
        log::debug!(
            "palette: {} colors ({method:?})",
            indexed.palette.len(),
        );
        Reduced {
            image: self.image,
            target: self.target,
            indexed,
            method,
        }
    }
}

// ───────────────────────── Stage 11: Reduced ─────────────────────────

/// Final pipeline state: RGBA image plus its indexed form.
#[must_use = "call .into_result() to obtain the output"]
pub struct Reduced {
    image: RgbaImage,
    target: Dimensions,
    indexed: IndexedImage,
    method: PaletteMethod,
}

impl Reduced {
    /// The indexed-color image.
    pub const fn indexed(&self) -> &IndexedImage {
        &self.indexed
    }

    /// How the palette was built.
    #[must_use]
    pub const fn method(&self) -> PaletteMethod {
        self.method
    }

    /// Consume the pipeline and return the final result.
    #[must_use]
    pub fn into_result(self) -> PixelizeResult {
        PixelizeResult {
            image: self.image,
            indexed: self.indexed,
            target: self.target,
        }
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental pixelize pipeline.
///
/// Created via [`Pipeline::new`], which stores the source and config
/// without doing any processing.
pub struct Pipeline;

impl Pipeline {
    /// Create a new pipeline from a source and config.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(source: impl Into<Source>, config: PixelizeConfig) -> Pending {
        Pending {
            config,
            source: source.into(),
        }
    }
}

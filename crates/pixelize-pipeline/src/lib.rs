//! pixelize-pipeline: Pure pixel-art conversion pipeline (sans-IO).
//!
//! Turns an arbitrary raster image into a small, palette-limited sprite
//! through:
//! decode -> optional background removal -> alpha threshold -> optional
//! trim -> resize onto a margin canvas -> posterize -> cleanup ->
//! optional outline -> upscale -> optional crop -> palette reduction.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices or decoded images and returns structured data. All
//! filesystem interaction lives in `pixelize-io`.

pub mod alpha;
pub mod background;
pub mod cleanup;
pub mod crop_box;
pub mod decode;
pub mod diagnostics;
pub mod geometry;
pub mod outline;
pub mod palette;
pub mod pipeline;
pub mod posterize;
pub mod rescale;
pub mod trim;
pub mod types;

pub use background::{BackgroundRemover, BackgroundRemoverKind};
pub use crop_box::{CropBox, ParseCropBoxError};
pub use diagnostics::{Clock, PipelineDiagnostics, StdClock, process_with_diagnostics};
pub use palette::{IndexedImage, PaletteMethod};
pub use pipeline::Pipeline;
pub use types::{
    Dimensions, OPAQUE_CUTOFF, PipelineError, PixelizeConfig, PixelizeResult, RgbaImage, Source,
};

/// Run the full pixelize pipeline with the built-in background remover.
///
/// Takes encoded image bytes (PNG, JPEG, BMP, GIF, WebP) or a decoded
/// [`RgbaImage`] and a configuration, and produces a [`PixelizeResult`]
/// holding the final RGBA image, its indexed form and the resolved
/// pre-scale canvas size.
///
/// # Pipeline steps
///
/// 1. Decode to RGBA
/// 2. Optional background removal (`rembg`)
/// 3. Alpha threshold (`alpha_min` / `alpha_max`)
/// 4. Optional trim to content (`inner`)
/// 5. Resolve target size, resize into the margin and composite
/// 6. Posterize (`color_reduction`)
/// 7. Cleanup sweep
/// 8. Optional outline (`border`)
/// 9. Nearest-neighbor upscale (`scale`)
/// 10. Optional crop (`crop`)
/// 11. Palette reduction
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if the bytes are empty,
/// [`PipelineError::ImageDecode`] if the format is unrecognized,
/// [`PipelineError::InvalidConfig`] for a zero scale or size,
/// [`PipelineError::EmptyContent`] if trimming finds nothing visible,
/// [`PipelineError::InvalidDimension`] if the margin leaves no content
/// area and [`PipelineError::CropOutOfBounds`] if the crop does not fit.
pub fn process(
    source: impl Into<Source>,
    config: &PixelizeConfig,
) -> Result<PixelizeResult, PipelineError> {
    process_with_remover(source, config, &BackgroundRemoverKind::default())
}

/// Run the full pipeline with a caller-supplied background remover.
///
/// The remover is only invoked when `config.rembg` is set.
///
/// # Errors
///
/// Same as [`process`], plus whatever `remover` returns.
pub fn process_with_remover(
    source: impl Into<Source>,
    config: &PixelizeConfig,
    remover: &dyn BackgroundRemover,
) -> Result<PixelizeResult, PipelineError> {
    Ok(Pipeline::new(source, config.clone())
        .decode()?
        .remove_background(remover)?
        .threshold()
        .trim()?
        .composite()?
        .posterize()
        .cleanup()
        .outline()
        .rescale()?
        .crop()?
        .reduce_palette()
        .into_result())
}

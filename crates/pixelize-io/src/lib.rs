//! pixelize-io: Filesystem and stream boundary for the pixelize
//! pipeline.
//!
//! Resolves a path, byte stream or decoded image into a pipeline
//! source, runs [`pixelize_pipeline`], and optionally persists the
//! result as an indexed PNG through [`pixelize_export`].

pub mod error;
pub mod input;
pub mod output;

pub use error::PixelizeError;
pub use input::Input;
pub use output::{DEFAULT_OUTPUT_DIR, Output, default_output_path, persist};

use pixelize_pipeline::{
    BackgroundRemover, BackgroundRemoverKind, PixelizeConfig, PixelizeResult,
};

/// Pixelize `input` and, if `output` is given, save the result.
///
/// Uses the built-in background remover when `config.rembg` is set.
///
/// # Errors
///
/// Returns [`PixelizeError::Read`] if the input file cannot be read,
/// [`PixelizeError::Pipeline`] for any processing failure, and the
/// errors of [`persist`] when saving.
pub fn pixelize(
    input: impl Into<Input>,
    output: Option<Output<'_>>,
    config: &PixelizeConfig,
) -> Result<PixelizeResult, PixelizeError> {
    pixelize_with_remover(input, output, config, &BackgroundRemoverKind::default())
}

/// [`pixelize`] with a caller-supplied background remover.
///
/// # Errors
///
/// Same as [`pixelize`].
pub fn pixelize_with_remover(
    input: impl Into<Input>,
    output: Option<Output<'_>>,
    config: &PixelizeConfig,
    remover: &dyn BackgroundRemover,
) -> Result<PixelizeResult, PixelizeError> {
    let source = input.into().into_source()?;
    let result = pixelize_pipeline::process_with_remover(source, config, remover)?;
    if let Some(output) = output {
        persist(&result.indexed, output)?;
    }
    Ok(result)
}

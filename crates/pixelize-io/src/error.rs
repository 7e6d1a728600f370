//! Error type for the I/O layer.

use std::path::PathBuf;

use pixelize_export::ExportError;
use pixelize_pipeline::PipelineError;

/// Errors that can occur while reading, processing or persisting an
/// image.
#[derive(Debug, thiserror::Error)]
pub enum PixelizeError {
    /// The input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The input stream could not be read.
    #[error("failed to read input stream: {0}")]
    ReadStream(#[source] std::io::Error),

    /// The output file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output stream could not be written.
    #[error("failed to write output stream: {0}")]
    WriteStream(#[source] std::io::Error),

    /// The output directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The pipeline rejected the input or configuration.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The result could not be encoded.
    #[error(transparent)]
    Export(#[from] ExportError),
}

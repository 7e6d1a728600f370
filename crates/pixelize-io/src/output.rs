//! Output sinks and default output naming.

use std::io::Write;
use std::path::{Path, PathBuf};

use pixelize_pipeline::IndexedImage;

use crate::error::PixelizeError;

/// Directory used for results when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "pixelized";

/// Suffix appended to the input stem for result files.
pub const OUTPUT_SUFFIX: &str = ".pix.png";

/// Where the result PNG goes.
pub enum Output<'a> {
    /// A file path. Missing parent directories are created.
    Path(PathBuf),
    /// Any byte sink.
    Writer(&'a mut dyn Write),
}

impl std::fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// `<out_dir>/<input stem>.pix.png`.
///
/// An input without a usable stem is named `image`.
#[must_use]
pub fn default_output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "image".into(), |s| s.to_string_lossy());
    out_dir.join(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Encode `indexed` and write it to `output`.
///
/// # Errors
///
/// Returns [`PixelizeError::Export`] if encoding fails,
/// [`PixelizeError::CreateDir`] if the parent directory cannot be
/// created and [`PixelizeError::Write`] / [`PixelizeError::WriteStream`]
/// if writing fails.
pub fn persist(indexed: &IndexedImage, output: Output<'_>) -> Result<(), PixelizeError> {
    let png = pixelize_export::to_png(indexed)?;
    match output {
        Output::Path(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| PixelizeError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, &png).map_err(|source| PixelizeError::Write {
                path: path.clone(),
                source,
            })?;
            log::info!("saved {} ({} bytes)", path.display(), png.len());
        }
        Output::Writer(writer) => {
            writer.write_all(&png).map_err(PixelizeError::WriteStream)?;
            writer.flush().map_err(PixelizeError::WriteStream)?;
            log::info!("wrote {} bytes to output stream", png.len());
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_path_uses_stem() {
        assert_eq!(
            default_output_path(Path::new("art/hero.jpeg"), Path::new("pixelized")),
            PathBuf::from("pixelized/hero.pix.png"),
        );
    }

    #[test]
    fn default_path_keeps_inner_dots() {
        assert_eq!(
            default_output_path(Path::new("hero.v2.png"), Path::new("out")),
            PathBuf::from("out/hero.v2.pix.png"),
        );
    }

    #[test]
    fn default_path_without_stem() {
        assert_eq!(
            default_output_path(Path::new(""), Path::new("out")),
            PathBuf::from("out/image.pix.png"),
        );
    }

    #[test]
    fn writer_receives_png() {
        let indexed = IndexedImage {
            width: 1,
            height: 1,
            palette: vec![[1, 2, 3, 255]],
            indices: vec![0],
        };
        let mut buf = Vec::new();
        persist(&indexed, Output::Writer(&mut buf)).unwrap();
        assert_eq!(&buf[..4], b"\x89PNG");
    }
}

//! Input resolution: path, byte stream or decoded image to a pipeline
//! [`Source`].

use std::io::Read;
use std::path::PathBuf;

use pixelize_pipeline::{RgbaImage, Source};

use crate::error::PixelizeError;

/// Where the image to pixelize comes from.
#[derive(Debug, Clone)]
pub enum Input {
    /// An encoded image file on disk.
    Path(PathBuf),
    /// Encoded image bytes already in memory.
    Bytes(Vec<u8>),
    /// An already decoded image.
    Image(RgbaImage),
}

impl Input {
    /// Read an encoded image from `reader` until EOF.
    ///
    /// # Errors
    ///
    /// Returns [`PixelizeError::ReadStream`] if reading fails.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, PixelizeError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(PixelizeError::ReadStream)?;
        Ok(Self::Bytes(bytes))
    }

    /// Resolve into a pipeline source, reading the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PixelizeError::Read`] if the file cannot be read.
    pub fn into_source(self) -> Result<Source, PixelizeError> {
        match self {
            Self::Path(path) => {
                let bytes = std::fs::read(&path)
                    .map_err(|source| PixelizeError::Read { path: path.clone(), source })?;
                log::debug!("read {} bytes from {}", bytes.len(), path.display());
                Ok(Source::Encoded(bytes))
            }
            Self::Bytes(bytes) => Ok(Source::Encoded(bytes)),
            Self::Image(image) => Ok(Source::Decoded(image)),
        }
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&std::path::Path> for Input {
    fn from(path: &std::path::Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<RgbaImage> for Input {
    fn from(image: RgbaImage) -> Self {
        Self::Image(image)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reader_is_drained() {
        let input = Input::from_reader(&b"abc"[..]).unwrap();
        assert!(matches!(input, Input::Bytes(ref b) if b == b"abc"));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = PathBuf::from("/nonexistent/pixelize/input.png");
        let err = Input::Path(path.clone()).into_source().unwrap_err();
        assert!(matches!(err, PixelizeError::Read { path: ref p, .. } if *p == path));
    }

    #[test]
    fn image_passes_through_decoded() {
        let img = RgbaImage::new(2, 3);
        let source = Input::from(img.clone()).into_source().unwrap();
        assert!(matches!(source, Source::Decoded(ref i) if *i == img));
    }
}

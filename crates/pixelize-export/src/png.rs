//! Palette PNG serializer.
//!
//! Writes an [`IndexedImage`] as an 8-bit indexed PNG: one `PLTE` entry
//! per palette color, a `tRNS` chunk carrying the palette alpha values
//! (trailing fully opaque entries are omitted) and the pixel indices.
//! Compression is set to the encoder's best level.
//!
//! This is a pure function with no filesystem access -- it returns a
//! `Vec<u8>` or writes to any [`std::io::Write`].

use std::io::Write;

use png::{BitDepth, ColorType, Compression, Encoder};

use pixelize_pipeline::IndexedImage;

/// Errors that can occur while encoding.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image cannot be represented as an indexed PNG.
    #[error("invalid indexed image: {0}")]
    InvalidImage(String),

    /// The PNG encoder failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Encode `image` as an indexed PNG in memory.
///
/// # Errors
///
/// Returns [`ExportError::InvalidImage`] if the palette is empty or too
/// large or the index buffer does not match the dimensions, and
/// [`ExportError::Encode`] if the encoder fails.
pub fn to_png(image: &IndexedImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_png(image, &mut buf)?;
    Ok(buf)
}

/// Encode `image` as an indexed PNG into `writer`.
///
/// # Errors
///
/// Same as [`to_png`]; I/O failures of `writer` surface as
/// [`ExportError::Encode`].
pub fn write_png<W: Write>(image: &IndexedImage, writer: W) -> Result<(), ExportError> {
    validate(image)?;

    let plte: Vec<u8> = image
        .palette
        .iter()
        .flat_map(|&[r, g, b, _]| [r, g, b])
        .collect();
    let trns = transparency_chunk(&image.palette);

    let mut encoder = Encoder::new(writer, image.width, image.height);
    encoder.set_color(ColorType::Indexed);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Best);
    encoder.set_palette(plte);
    if !trns.is_empty() {
        encoder.set_trns(trns);
    }

    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(&image.indices)?;
    png_writer.finish()?;
    Ok(())
}

/// Palette alpha values with the trailing run of 255s removed.
fn transparency_chunk(palette: &[[u8; 4]]) -> Vec<u8> {
    let mut alphas: Vec<u8> = palette.iter().map(|c| c[3]).collect();
    while alphas.last() == Some(&255) {
        alphas.pop();
    }
    alphas
}

fn validate(image: &IndexedImage) -> Result<(), ExportError> {
    if image.palette.is_empty() {
        return Err(ExportError::InvalidImage("palette is empty".to_owned()));
    }
    if image.palette.len() > pixelize_pipeline::palette::MAX_COLORS {
        return Err(ExportError::InvalidImage(format!(
            "palette has {} entries, at most {} allowed",
            image.palette.len(),
            pixelize_pipeline::palette::MAX_COLORS,
        )));
    }
    let expected = u64::from(image.width) * u64::from(image.height);
    if image.indices.len() as u64 != expected {
        return Err(ExportError::InvalidImage(format!(
            "{} indices for a {}x{} image",
            image.indices.len(),
            image.width,
            image.height,
        )));
    }
    if let Some(&bad) = image
        .indices
        .iter()
        .find(|&&i| usize::from(i) >= image.palette.len())
    {
        return Err(ExportError::InvalidImage(format!(
            "index {bad} outside a {}-entry palette",
            image.palette.len(),
        )));
    }
    Ok(())
}

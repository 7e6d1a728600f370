//! Image decoding into the RGBA working buffer.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, GIF, WebP) or an already
//! decoded image and produces the 8-bit RGBA buffer every later stage
//! operates on.

use crate::types::{PipelineError, RgbaImage, Source};

/// Decode raw image bytes into an RGBA buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Resolve a [`Source`] into an RGBA buffer.
///
/// # Errors
///
/// Returns the errors of [`decode_rgba`] for encoded sources, and
/// [`PipelineError::EmptyInput`] for a decoded image with a zero
/// dimension.
pub fn resolve(source: Source) -> Result<RgbaImage, PipelineError> {
    let image = match source {
        Source::Encoded(bytes) => decode_rgba(&bytes)?,
        Source::Decoded(image) => image,
    };
    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgba(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgba(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn png_decodes_with_alpha_preserved() {
        let img = RgbaImage::from_fn(3, 2, |x, _| image::Rgba([10, 20, 30, (x * 100) as u8]));
        let decoded = decode_rgba(&encode_png(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn rgb_source_becomes_opaque_rgba() {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            2,
            2,
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        let decoded = decode_rgba(&buf).unwrap();
        assert!(decoded.pixels().all(|p| p.0 == [1, 2, 3, 255]));
    }

    #[test]
    fn decoded_source_passes_through() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([9, 9, 9, 9]));
        let resolved = resolve(Source::Decoded(img.clone())).unwrap();
        assert_eq!(resolved, img);
    }

    #[test]
    fn zero_sized_decoded_source_is_rejected() {
        let result = resolve(Source::Decoded(RgbaImage::new(0, 5)));
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }
}

//! Posterization: floor RGB channels to a power-of-two step.

use image::Rgba;

use crate::types::RgbaImage;

/// Bucket width for a given reduction exponent (`2^k`).
///
/// Exponents of 8 and above collapse every channel to zero.
#[must_use]
pub const fn step(color_reduction: u8) -> u32 {
    let exponent = if color_reduction > 8 { 8 } else { color_reduction };
    1_u32 << exponent
}

/// Floor one channel to a multiple of `step`.
#[must_use]
pub const fn floor_channel(channel: u8, step: u32) -> u8 {
    // The result never exceeds `channel`, so the narrowing is lossless.
    #[allow(clippy::cast_possible_truncation)]
    let floored = (channel as u32 / step * step) as u8;
    floored
}

/// Posterize one pixel; alpha is untouched.
#[must_use]
pub const fn posterize_pixel(pixel: Rgba<u8>, step: u32) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    Rgba([
        floor_channel(r, step),
        floor_channel(g, step),
        floor_channel(b, step),
        a,
    ])
}

/// Posterize every pixel in place. A zero exponent is a no-op.
pub fn posterize(image: &mut RgbaImage, color_reduction: u8) {
    if color_reduction == 0 {
        return;
    }
    let step = step(color_reduction);
    for pixel in image.pixels_mut() {
        *pixel = posterize_pixel(*pixel, step);
    }
}

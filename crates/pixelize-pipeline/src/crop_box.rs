//! Crop rectangle applied to the final, rescaled image.
//!
//! A [`CropBox`] is written as `WxH+XxY`, for example `100x100+150x150`
//! for a 100×100 window whose top-left corner sits at (150, 150). All
//! four components are unsigned decimal integers; signs, whitespace and
//! any other characters are rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A crop rectangle in post-scale pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CropBox {
    /// Width of the crop window in pixels.
    pub width: u32,
    /// Height of the crop window in pixels.
    pub height: u32,
    /// Horizontal offset of the top-left corner.
    pub x: u32,
    /// Vertical offset of the top-left corner.
    pub y: u32,
}

impl CropBox {
    /// Create a new crop box.
    #[must_use]
    pub const fn new(width: u32, height: u32, x: u32, y: u32) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }

    /// Exclusive right edge, or `None` on overflow.
    #[must_use]
    pub const fn right(&self) -> Option<u32> {
        self.x.checked_add(self.width)
    }

    /// Exclusive bottom edge, or `None` on overflow.
    #[must_use]
    pub const fn bottom(&self) -> Option<u32> {
        self.y.checked_add(self.height)
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}x{}", self.width, self.height, self.x, self.y)
    }
}

/// The text did not match `WxH+XxY`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid box: {input:?} (expected WxH+XxY, e.g. 100x100+150x150)")]
pub struct ParseCropBoxError {
    input: String,
}

impl ParseCropBoxError {
    /// The rejected input text.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for CropBox {
    type Err = ParseCropBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCropBoxError {
            input: s.to_owned(),
        };

        let (size, offset) = s.split_once('+').ok_or_else(invalid)?;
        let (width, height) = parse_pair(size).ok_or_else(invalid)?;
        let (x, y) = parse_pair(offset).ok_or_else(invalid)?;
        Ok(Self::new(width, height, x, y))
    }
}

/// Parse `<uint>x<uint>`.
fn parse_pair(s: &str) -> Option<(u32, u32)> {
    let (a, b) = s.split_once('x')?;
    Some((parse_uint(a)?, parse_uint(b)?))
}

/// Parse a non-empty run of ASCII digits.
///
/// `u32::from_str` alone would accept a leading `+`.
fn parse_uint(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl TryFrom<String> for CropBox {
    type Error = ParseCropBoxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CropBox> for String {
    fn from(value: CropBox) -> Self {
        value.to_string()
    }
}

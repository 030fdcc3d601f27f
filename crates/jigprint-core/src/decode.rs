//! Source image decoding.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! read-only, premultiplied drawing source shared by every piece.

use image::RgbaImage;
use tiny_skia::{ColorU8, Pixmap, PixmapRef};

use crate::types::{Dimensions, PuzzleError};

/// Decoded source image, ready to be sampled by the rasterizer.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixmap: Pixmap,
}

impl SourceImage {
    /// Convert a straight-alpha RGBA image into a drawing source.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::CanvasAllocation`] if the image has a zero
    /// dimension or is too large for a drawing surface.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, PuzzleError> {
        let (width, height) = image.dimensions();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(PuzzleError::CanvasAllocation { width, height })?;
        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(Self { pixmap })
    }

    /// Source image dimensions in pixels.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    pub(crate) fn as_pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }
}

/// Decode raw image bytes into a [`SourceImage`].
///
/// # Errors
///
/// Returns [`PuzzleError::EmptyInput`] if `bytes` is empty.
/// Returns [`PuzzleError::ImageLoad`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, PuzzleError> {
    if bytes.is_empty() {
        return Err(PuzzleError::EmptyInput);
    }
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    SourceImage::from_rgba(&rgba)
}

//! Shared types for the jigprint core.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can build test fixtures
/// without depending on `image` directly.
pub use image::RgbaImage;

/// Fraction of a piece's width/height reserved on every side for knobs.
pub const KNOB_RATIO: f64 = 0.2;

/// Piece counts offered to the user. All are perfect squares.
pub const PIECE_COUNT_MENU: [u32; 8] = [4, 9, 16, 25, 36, 49, 64, 81];

/// Shape of one side of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    /// Straight outer boundary.
    Flat,
    /// Protrudes outward from the piece.
    Knob,
    /// Indents into the piece.
    Socket,
}

impl Edge {
    /// The shape the neighbour sees across the same joint.
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Flat => Self::Flat,
            Self::Knob => Self::Socket,
            Self::Socket => Self::Knob,
        }
    }

    /// Returns `true` for [`Edge::Flat`].
    #[must_use]
    pub const fn is_flat(self) -> bool {
        matches!(self, Self::Flat)
    }
}

/// The four sides of one piece, clockwise from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceShape {
    pub top: Edge,
    pub right: Edge,
    pub bottom: Edge,
    pub left: Edge,
}

impl PieceShape {
    /// Sides in drawing order: top, right, bottom, left.
    #[must_use]
    pub const fn sides(&self) -> [Edge; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

/// A 2D point in canvas coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation from `self` toward `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }

    /// `self + dir * scale`.
    #[must_use]
    pub fn offset(self, dir: Self, scale: f64) -> Self {
        Self {
            x: dir.x.mul_add(scale, self.x),
            y: dir.y.mul_add(scale, self.y),
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// An integer pixel rectangle in source-image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Configuration for slicing a puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Total number of pieces. Must be a perfect square of at least 4.
    pub piece_count: u32,

    /// Width of the cut-line stroke in pixels.
    pub stroke_width: f32,

    /// Straight (non-premultiplied) RGBA color of the cut-line stroke.
    pub stroke_color: [u8; 4],
}

impl PuzzleConfig {
    pub const DEFAULT_PIECE_COUNT: u32 = 16;
    pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
    pub const DEFAULT_STROKE_COLOR: [u8; 4] = [0, 0, 0, 128];

    /// Check the configuration and return the grid side length.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidGridSize`] if `piece_count` is not a
    /// perfect square of at least 4, or [`PuzzleError::InvalidConfig`] if
    /// `stroke_width` is not finite and positive.
    pub fn validate(&self) -> Result<u32, PuzzleError> {
        let side = crate::grid::grid_side(self.piece_count)?;
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(PuzzleError::InvalidConfig(format!(
                "stroke_width must be finite and positive, got {}",
                self.stroke_width
            )));
        }
        Ok(side)
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            piece_count: Self::DEFAULT_PIECE_COUNT,
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            stroke_color: Self::DEFAULT_STROKE_COLOR,
        }
    }
}

/// Errors that can occur while slicing a puzzle.
///
/// Every variant is terminal for the current batch: no partial piece set
/// is ever produced alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    /// The piece count is not a perfect square with side of at least 2.
    #[error("piece count {piece_count} is not a perfect square of at least 4")]
    InvalidGridSize { piece_count: u32 },

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Failed to decode the source image.
    #[error("failed to decode image: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// A drawing surface could not be allocated.
    #[error("could not allocate a {width}x{height} drawing surface")]
    CanvasAllocation { width: u32, height: u32 },

    /// A finished piece could not be encoded as PNG.
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    /// Puzzle configuration is invalid.
    #[error("invalid puzzle configuration: {0}")]
    InvalidConfig(String),
}

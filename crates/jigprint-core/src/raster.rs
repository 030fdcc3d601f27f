//! Per-piece rasterization.
//!
//! Each piece is drawn onto a canvas padded by [`KNOB_RATIO`] of its size
//! on every side so knobs have room to protrude. The outline is filled
//! with the source image at a 1:1 pixel mapping (integer translation,
//! nearest sampling), which acts as a clip: only the pixels inside the
//! curved outline are copied, including knob content that belongs to the
//! neighbouring cell in source space. The same outline is then stroked as
//! a cut line and the canvas is encoded as PNG.
//!
//! A single [`SurfaceArena`] surface, sized for the largest piece, is
//! reused for every piece in a batch.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, FilterQuality, IntRect, LineJoin, Paint, Pattern, Pixmap, SpreadMode, Stroke,
    Transform,
};

use crate::decode::SourceImage;
use crate::outline::{Frame, piece_outline};
use crate::types::{Dimensions, KNOB_RATIO, PieceShape, PixelRect, PuzzleConfig, PuzzleError};

/// Margin reserved around a piece, in pixels, on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    /// Left and right margin.
    pub x: u32,
    /// Top and bottom margin.
    pub y: u32,
}

impl Padding {
    /// Padding for a piece of the given size: `ceil(size * KNOB_RATIO)`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn for_cell(cell: Dimensions) -> Self {
        // The epsilon keeps exact multiples (200 * 0.2) from rounding up.
        let pad = |len: u32| (f64::from(len).mul_add(KNOB_RATIO, -1e-9)).ceil().max(0.0) as u32;
        Self {
            x: pad(cell.width),
            y: pad(cell.height),
        }
    }

    /// Canvas size for a piece of the given size.
    #[must_use]
    pub const fn canvas(self, cell: Dimensions) -> Dimensions {
        Dimensions {
            width: cell.width + 2 * self.x,
            height: cell.height + 2 * self.y,
        }
    }
}

/// A finished, outlined piece image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceImage {
    png: Vec<u8>,
    size: Dimensions,
    padding: Padding,
}

impl PieceImage {
    /// Encoded PNG bytes.
    #[must_use]
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Canvas size, including padding.
    #[must_use]
    pub const fn size(&self) -> Dimensions {
        self.size
    }

    /// Margin around the unpadded piece rectangle.
    #[must_use]
    pub const fn padding(&self) -> Padding {
        self.padding
    }

    /// The PNG as a self-contained `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.png))
    }
}

/// Reusable drawing surface.
///
/// Grows when asked for a canvas larger than it holds; otherwise the
/// same pixels are cleared and redrawn for every piece.
#[derive(Debug)]
pub struct SurfaceArena {
    pixmap: Pixmap,
}

impl SurfaceArena {
    /// Allocate a surface large enough for `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::CanvasAllocation`] if the surface cannot be
    /// created (zero or oversized dimensions).
    pub fn new(canvas: Dimensions) -> Result<Self, PuzzleError> {
        Ok(Self {
            pixmap: allocate(canvas)?,
        })
    }

    /// Current surface size.
    #[must_use]
    pub fn capacity(&self) -> Dimensions {
        Dimensions {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    /// A cleared surface at least as large as `canvas`.
    fn acquire(&mut self, canvas: Dimensions) -> Result<&mut Pixmap, PuzzleError> {
        let capacity = self.capacity();
        if canvas.width > capacity.width || canvas.height > capacity.height {
            self.pixmap = allocate(Dimensions {
                width: canvas.width.max(capacity.width),
                height: canvas.height.max(capacity.height),
            })?;
        } else {
            self.pixmap.fill(Color::TRANSPARENT);
        }
        Ok(&mut self.pixmap)
    }
}

fn allocate(canvas: Dimensions) -> Result<Pixmap, PuzzleError> {
    Pixmap::new(canvas.width, canvas.height).ok_or(PuzzleError::CanvasAllocation {
        width: canvas.width,
        height: canvas.height,
    })
}

/// Draws pieces of one source image.
#[derive(Debug)]
pub struct Rasterizer<'a> {
    source: &'a SourceImage,
    arena: SurfaceArena,
    stroke_paint: Paint<'static>,
    stroke: Stroke,
}

impl<'a> Rasterizer<'a> {
    /// Create a rasterizer whose surface fits pieces up to `max_cell`.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::CanvasAllocation`] if the surface cannot be
    /// allocated.
    pub fn new(
        source: &'a SourceImage,
        max_cell: Dimensions,
        config: &PuzzleConfig,
    ) -> Result<Self, PuzzleError> {
        let arena = SurfaceArena::new(Padding::for_cell(max_cell).canvas(max_cell))?;

        let [r, g, b, a] = config.stroke_color;
        let mut stroke_paint = Paint::default();
        stroke_paint.set_color_rgba8(r, g, b, a);
        stroke_paint.anti_alias = true;

        let stroke = Stroke {
            width: config.stroke_width,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        Ok(Self {
            source,
            arena,
            stroke_paint,
            stroke,
        })
    }

    /// Size of the shared surface.
    #[must_use]
    pub fn surface_size(&self) -> Dimensions {
        self.arena.capacity()
    }

    /// Render the piece covering `rect` of the source with the given sides.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::CanvasAllocation`] if the piece is empty or
    /// its canvas cannot be allocated, and [`PuzzleError::Encode`] if PNG
    /// encoding fails.
    #[allow(clippy::cast_precision_loss)]
    pub fn render(&mut self, rect: PixelRect, shape: PieceShape) -> Result<PieceImage, PuzzleError> {
        let cell = Dimensions {
            width: rect.width,
            height: rect.height,
        };
        let padding = Padding::for_cell(cell);
        let canvas = padding.canvas(cell);
        let unusable = PuzzleError::CanvasAllocation {
            width: canvas.width,
            height: canvas.height,
        };
        if cell.width == 0 || cell.height == 0 {
            return Err(unusable);
        }

        let frame = Frame {
            x: f64::from(padding.x),
            y: f64::from(padding.y),
            width: f64::from(cell.width),
            height: f64::from(cell.height),
        };
        let path = piece_outline(frame, shape, KNOB_RATIO)
            .to_path()
            .ok_or(unusable)?;

        // Canvas origin sits at (rect.x - pad.x, rect.y - pad.y) in source space.
        let dx = i64::from(padding.x) - i64::from(rect.x);
        let dy = i64::from(padding.y) - i64::from(rect.y);
        let image_paint = Paint {
            shader: Pattern::new(
                self.source.as_pixmap(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::from_translate(dx as f32, dy as f32),
            ),
            anti_alias: true,
            ..Paint::default()
        };

        let surface = self.arena.acquire(canvas)?;
        surface.fill_path(
            &path,
            &image_paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        surface.stroke_path(
            &path,
            &self.stroke_paint,
            &self.stroke,
            Transform::identity(),
            None,
        );

        let crop = IntRect::from_xywh(0, 0, canvas.width, canvas.height).ok_or(
            PuzzleError::CanvasAllocation {
                width: canvas.width,
                height: canvas.height,
            },
        )?;
        let piece = surface
            .clone_rect(crop)
            .ok_or(PuzzleError::CanvasAllocation {
                width: canvas.width,
                height: canvas.height,
            })?;
        let png = piece
            .encode_png()
            .map_err(|e| PuzzleError::Encode(e.to_string()))?;

        Ok(PieceImage {
            png,
            size: canvas,
            padding,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::types::Edge;

    /// 100x100 gradient: red encodes x, green encodes y.
    fn gradient_source() -> SourceImage {
        let img = RgbaImage::from_fn(100, 100, |x, y| {
            Rgba([(x * 2) as u8, (y * 2) as u8, 0, 255])
        });
        SourceImage::from_rgba(&img).unwrap()
    }

    fn decode(piece: &PieceImage) -> RgbaImage {
        image::load_from_memory(piece.png()).unwrap().to_rgba8()
    }

    const CELL: PixelRect = PixelRect {
        x: 0,
        y: 0,
        width: 50,
        height: 50,
    };

    const CORNER: PieceShape = PieceShape {
        top: Edge::Flat,
        right: Edge::Knob,
        bottom: Edge::Socket,
        left: Edge::Flat,
    };

    fn cell_dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn padding_is_knob_ratio_of_each_axis() {
        let pad = Padding::for_cell(cell_dims(200, 200));
        assert_eq!(pad, Padding { x: 40, y: 40 });
        assert_eq!(pad.canvas(cell_dims(200, 200)), cell_dims(280, 280));
    }

    #[test]
    fn padding_rounds_up() {
        let pad = Padding::for_cell(cell_dims(267, 268));
        // 53.4 -> 54, 53.6 -> 54
        assert_eq!(pad, Padding { x: 54, y: 54 });
        assert_eq!(pad.canvas(cell_dims(267, 268)), cell_dims(375, 376));
    }

    #[test]
    fn output_is_padded_canvas() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let piece = r.render(CELL, CORNER).unwrap();
        assert_eq!(piece.size(), cell_dims(70, 70));
        assert_eq!(piece.padding(), Padding { x: 10, y: 10 });
        let img = decode(&piece);
        assert_eq!(img.dimensions(), (70, 70));
    }

    #[test]
    fn interior_is_copied_one_to_one() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let img = decode(&r.render(CELL, CORNER).unwrap());
        // Canvas (35, 35) maps to source (25, 25).
        assert_eq!(img.get_pixel(35, 35).0, [50, 50, 0, 255]);
        assert_eq!(img.get_pixel(20, 40).0, [20, 60, 0, 255]);
    }

    #[test]
    fn padding_outside_flat_sides_is_transparent() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let img = decode(&r.render(CELL, CORNER).unwrap());
        assert_eq!(img.get_pixel(2, 2).0[3], 0);
        assert_eq!(img.get_pixel(5, 35).0[3], 0);
    }

    #[test]
    fn knob_carries_neighbour_content() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let img = decode(&r.render(CELL, CORNER).unwrap());
        // Right knob bulges to x = 67.5 around y = 35; canvas (63, 35) is
        // source (53, 25), inside the right-hand neighbour.
        assert_eq!(img.get_pixel(63, 35).0, [106, 50, 0, 255]);
    }

    #[test]
    fn socket_is_cut_away() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let img = decode(&r.render(CELL, CORNER).unwrap());
        // Bottom socket dips to y = 52.5 around x = 35.
        assert_eq!(img.get_pixel(35, 56).0[3], 0);
        // Outside the socket span the bottom edge is intact.
        assert_eq!(img.get_pixel(15, 56).0[3], 255);
    }

    #[test]
    fn cut_line_is_stroked() {
        let source = SourceImage::from_rgba(&RgbaImage::from_pixel(
            100,
            100,
            Rgba([255, 255, 255, 255]),
        ))
        .unwrap();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let img = decode(&r.render(CELL, CORNER).unwrap());
        // On the flat left edge the stroke darkens the white image.
        let on_edge = img.get_pixel(10, 30).0;
        assert!(on_edge[0] < 255, "expected darkened edge, got {on_edge:?}");
        let inside = img.get_pixel(30, 30).0;
        assert_eq!(inside, [255, 255, 255, 255]);
    }

    #[test]
    fn arena_is_reused_and_cleared() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let knobs = PieceShape {
            top: Edge::Knob,
            right: Edge::Knob,
            bottom: Edge::Knob,
            left: Edge::Knob,
        };
        let rect = PixelRect {
            x: 25,
            y: 25,
            width: 50,
            height: 50,
        };
        let _ = r.render(rect, knobs).unwrap();
        let before = r.surface_size();
        // The second piece must not inherit the first piece's knobs.
        let img = decode(&r.render(CELL, CORNER).unwrap());
        assert_eq!(r.surface_size(), before);
        assert_eq!(img.get_pixel(35, 3).0[3], 0);
    }

    #[test]
    fn arena_grows_for_larger_pieces() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(10, 10), &PuzzleConfig::default()).unwrap();
        assert_eq!(r.surface_size(), cell_dims(14, 14));
        let piece = r.render(CELL, CORNER).unwrap();
        assert_eq!(piece.size(), cell_dims(70, 70));
        assert_eq!(r.surface_size(), cell_dims(70, 70));
    }

    #[test]
    fn empty_cell_fails() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let rect = PixelRect {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert!(matches!(
            r.render(rect, CORNER),
            Err(PuzzleError::CanvasAllocation { .. })
        ));
    }

    #[test]
    fn zero_surface_fails() {
        assert!(matches!(
            SurfaceArena::new(cell_dims(0, 0)),
            Err(PuzzleError::CanvasAllocation {
                width: 0,
                height: 0
            })
        ));
    }

    #[test]
    fn data_url_is_base64_png() {
        let source = gradient_source();
        let mut r = Rasterizer::new(&source, cell_dims(50, 50), &PuzzleConfig::default()).unwrap();
        let piece = r.render(CELL, CORNER).unwrap();
        let url = piece.data_url();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), piece.png());
    }
}

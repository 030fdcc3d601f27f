//! Curved piece outlines.
//!
//! An outline is a single closed contour walked clockwise (top, right,
//! bottom, left) from the top-left corner of the unpadded piece rectangle.
//! Every side is built by the same routine from its own start and end
//! points: the outward normal is the side vector rotated a quarter turn,
//! so no side needs special-casing.
//!
//! ```text
//!   start        20%        80%         end
//!     o-----------o~~~~~~~~~~o-----------o      flat, then cubic, then flat
//!                 ^          ^
//!              ctrl1      ctrl2   (offset along the normal)
//! ```

use tiny_skia::{Path, PathBuilder};

use crate::types::{Edge, PieceShape, Point};

/// Fraction along a side where the knob curve begins.
const CURVE_START: f64 = 0.2;
/// Fraction along a side where the knob curve ends.
const CURVE_END: f64 = 0.8;

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    /// Corners clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(right, bottom),
            Point::new(self.x, bottom),
        ]
    }
}

/// One drawing command after the initial move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    /// Straight line to a point.
    Line(Point),
    /// Cubic Bezier to `to`.
    Cubic { ctrl1: Point, ctrl2: Point, to: Point },
}

/// A closed piece outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    start: Point,
    segments: Vec<Segment>,
}

impl Outline {
    /// Starting corner (top-left of the piece rectangle).
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Drawing commands in order. The contour is implicitly closed.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Build a `tiny-skia` path from the outline.
    ///
    /// Returns `None` if `tiny-skia` rejects the bounds (empty or non-finite).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_path(&self) -> Option<Path> {
        let f = |p: Point| (p.x as f32, p.y as f32);
        let mut pb = PathBuilder::new();
        let (x, y) = f(self.start);
        pb.move_to(x, y);
        for segment in &self.segments {
            match *segment {
                Segment::Line(to) => {
                    let (x, y) = f(to);
                    pb.line_to(x, y);
                }
                Segment::Cubic { ctrl1, ctrl2, to } => {
                    let (x1, y1) = f(ctrl1);
                    let (x2, y2) = f(ctrl2);
                    let (x, y) = f(to);
                    pb.cubic_to(x1, y1, x2, y2, x, y);
                }
            }
        }
        pb.close();
        pb.finish()
    }
}

/// Build the outline of a piece occupying `frame` with the given sides.
///
/// `knob_ratio` scales the control-point offset relative to each side's
/// own length.
#[must_use]
pub fn piece_outline(frame: Frame, shape: PieceShape, knob_ratio: f64) -> Outline {
    let corners = frame.corners();
    let mut segments = Vec::with_capacity(12);
    for (i, edge) in shape.sides().into_iter().enumerate() {
        let from = corners[i];
        let to = corners[(i + 1) % 4];
        push_side(&mut segments, from, to, edge, knob_ratio);
    }
    Outline {
        start: corners[0],
        segments,
    }
}

/// Unit normal pointing away from the interior of a clockwise contour.
///
/// With y growing downward, rotating the side direction `(dx, dy)` to
/// `(dy, -dx)` points outward on every side.
fn outward_normal(from: Point, to: Point) -> Point {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len <= f64::EPSILON {
        return Point::new(0.0, 0.0);
    }
    Point::new(dy / len, -dx / len)
}

fn push_side(segments: &mut Vec<Segment>, from: Point, to: Point, edge: Edge, knob_ratio: f64) {
    let sign = match edge {
        Edge::Flat => {
            segments.push(Segment::Line(to));
            return;
        }
        Edge::Knob => 1.0,
        Edge::Socket => -1.0,
    };

    let length = (to.x - from.x).hypot(to.y - from.y);
    let normal = outward_normal(from, to);
    let amplitude = sign * knob_ratio * length;

    let curve_start = from.lerp(to, CURVE_START);
    let curve_end = from.lerp(to, CURVE_END);

    segments.push(Segment::Line(curve_start));
    segments.push(Segment::Cubic {
        ctrl1: curve_start.offset(normal, amplitude),
        ctrl2: curve_end.offset(normal, amplitude),
        to: curve_end,
    });
    segments.push(Segment::Line(to));
}

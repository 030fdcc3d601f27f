//! Jigsaw topology: which side of every piece is a knob, socket or flat.
//!
//! Each internal edge is a single shared joint drawn once and read from
//! both sides: the left/upper cell sees the recorded value and the
//! right/lower cell sees its inverse. This makes mismatched neighbours
//! (knob against knob, socket against socket) unrepresentable.
//!
//! # Randomness
//!
//! Joint values come from a [`JointSource`]. [`RandomJoints`] adapts any
//! `rand` RNG; [`ScriptedJoints`] replays a fixed pattern.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Edge, PieceShape, PuzzleError};

/// Source of one knob-or-socket decision per internal joint.
pub trait JointSource {
    /// `true` means the joint is a knob from the left/upper cell's side.
    fn next_is_knob(&mut self) -> bool;
}

impl<T: JointSource + ?Sized> JointSource for &mut T {
    fn next_is_knob(&mut self) -> bool {
        (**self).next_is_knob()
    }
}

/// Uniform joints drawn from a `rand` RNG.
#[derive(Debug, Clone)]
pub struct RandomJoints<R>(pub R);

impl<R: Rng> JointSource for RandomJoints<R> {
    fn next_is_knob(&mut self) -> bool {
        self.0.random_bool(0.5)
    }
}

/// Replays a fixed bit pattern, wrapping around when exhausted.
///
/// An empty pattern yields only sockets.
#[derive(Debug, Clone)]
pub struct ScriptedJoints {
    pattern: Vec<bool>,
    position: usize,
}

impl ScriptedJoints {
    /// Create a source that replays `pattern` in order.
    #[must_use]
    pub const fn new(pattern: Vec<bool>) -> Self {
        Self {
            pattern,
            position: 0,
        }
    }
}

impl JointSource for ScriptedJoints {
    fn next_is_knob(&mut self) -> bool {
        if self.pattern.is_empty() {
            return false;
        }
        let bit = self.pattern[self.position % self.pattern.len()];
        self.position = self.position.wrapping_add(1);
        bit
    }
}

/// Joint assignment for an `N` x `N` grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    side: usize,
    /// Vertical edges between `(row, col)` and `(row, col + 1)`,
    /// `N` rows of `N - 1`, from the left cell's perspective.
    horizontal: Vec<Edge>,
    /// Horizontal edges between `(row, col)` and `(row + 1, col)`,
    /// `N - 1` rows of `N`, from the upper cell's perspective.
    vertical: Vec<Edge>,
}

impl Topology {
    /// Draw a topology for a `side` x `side` grid.
    ///
    /// Horizontal joints are drawn first in row-major order, then
    /// vertical joints in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::InvalidGridSize`] if `side` is below
    /// [`MIN_SIDE`](crate::grid::MIN_SIDE) or `side * side` overflows.
    pub fn generate(side: u32, mut source: impl JointSource) -> Result<Self, PuzzleError> {
        let piece_count = side
            .checked_mul(side)
            .ok_or(PuzzleError::InvalidGridSize {
                piece_count: u32::MAX,
            })?;
        crate::grid::grid_side(piece_count)?;

        let n = side as usize;
        let mut draw = || {
            if source.next_is_knob() {
                Edge::Knob
            } else {
                Edge::Socket
            }
        };
        let horizontal = (0..n * (n - 1)).map(|_| draw()).collect();
        let vertical = (0..(n - 1) * n).map(|_| draw()).collect();

        Ok(Self {
            side: n,
            horizontal,
            vertical,
        })
    }

    /// Draw a topology using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Same as [`Topology::generate`].
    pub fn random(side: u32) -> Result<Self, PuzzleError> {
        Self::generate(side, RandomJoints(rand::rng()))
    }

    /// Grid side length `N`.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    /// Shape of the piece at `(row, col)`.
    ///
    /// Returns `None` if the cell lies outside the grid.
    #[must_use]
    pub fn shape(&self, row: usize, col: usize) -> Option<PieceShape> {
        let n = self.side;
        if row >= n || col >= n {
            return None;
        }
        let last = n - 1;

        let top = if row == 0 {
            Edge::Flat
        } else {
            self.vertical[(row - 1) * n + col].inverse()
        };
        let right = if col == last {
            Edge::Flat
        } else {
            self.horizontal[row * last + col]
        };
        let bottom = if row == last {
            Edge::Flat
        } else {
            self.vertical[row * n + col]
        };
        let left = if col == 0 {
            Edge::Flat
        } else {
            self.horizontal[row * last + col - 1].inverse()
        };

        Some(PieceShape {
            top,
            right,
            bottom,
            left,
        })
    }

    /// All piece shapes in row-major order.
    #[must_use]
    pub fn shapes(&self) -> Vec<PieceShape> {
        let n = self.side;
        (0..n * n)
            .filter_map(|i| self.shape(i / n, i % n))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn assert_consistent(topology: &Topology) {
        let n = topology.side();
        for row in 0..n {
            for col in 0..n {
                let shape = topology.shape(row, col).unwrap();
                assert_eq!(shape.top.is_flat(), row == 0, "top ({row},{col})");
                assert_eq!(shape.left.is_flat(), col == 0, "left ({row},{col})");
                assert_eq!(shape.bottom.is_flat(), row == n - 1, "bottom ({row},{col})");
                assert_eq!(shape.right.is_flat(), col == n - 1, "right ({row},{col})");

                if col + 1 < n {
                    let neighbor = topology.shape(row, col + 1).unwrap();
                    assert_eq!(shape.right, neighbor.left.inverse());
                    assert_ne!(shape.right, neighbor.left);
                }
                if row + 1 < n {
                    let neighbor = topology.shape(row + 1, col).unwrap();
                    assert_eq!(shape.bottom, neighbor.top.inverse());
                    assert_ne!(shape.bottom, neighbor.top);
                }
            }
        }
    }

    #[test]
    fn neighbours_interlock_under_many_seeds() {
        for seed in 0..200 {
            let side = 2 + u32::try_from(seed % 8).unwrap();
            let rng = StdRng::seed_from_u64(seed);
            let topology = Topology::generate(side, RandomJoints(rng)).unwrap();
            assert_consistent(&topology);
        }
    }

    #[test]
    fn all_knobs_pattern() {
        let topology = Topology::generate(3, ScriptedJoints::new(vec![true])).unwrap();
        assert_consistent(&topology);
        let center = topology.shape(1, 1).unwrap();
        assert_eq!(center.right, Edge::Knob);
        assert_eq!(center.bottom, Edge::Knob);
        assert_eq!(center.left, Edge::Socket);
        assert_eq!(center.top, Edge::Socket);
    }

    #[test]
    fn scripted_draw_order_is_horizontal_then_vertical() {
        // 2x2: horizontal joints h0 (row 0), h1 (row 1); vertical v0, v1.
        let topology =
            Topology::generate(2, ScriptedJoints::new(vec![true, false, false, true])).unwrap();
        assert_eq!(topology.shape(0, 0).unwrap().right, Edge::Knob);
        assert_eq!(topology.shape(1, 0).unwrap().right, Edge::Socket);
        assert_eq!(topology.shape(0, 0).unwrap().bottom, Edge::Socket);
        assert_eq!(topology.shape(0, 1).unwrap().bottom, Edge::Knob);
        assert_consistent(&topology);
    }

    #[test]
    fn corner_pieces_have_two_flat_sides() {
        let topology = Topology::random(5).unwrap();
        for (row, col) in [(0, 0), (0, 4), (4, 0), (4, 4)] {
            let flats = topology
                .shape(row, col)
                .unwrap()
                .sides()
                .iter()
                .filter(|e| e.is_flat())
                .count();
            assert_eq!(flats, 2);
        }
    }

    #[test]
    fn shapes_are_row_major() {
        let topology = Topology::generate(4, RandomJoints(StdRng::seed_from_u64(7))).unwrap();
        let shapes = topology.shapes();
        assert_eq!(shapes.len(), 16);
        assert_eq!(shapes[5], topology.shape(1, 1).unwrap());
        assert_eq!(shapes[15], topology.shape(3, 3).unwrap());
    }

    #[test]
    fn same_seed_same_topology() {
        let a = Topology::generate(6, RandomJoints(StdRng::seed_from_u64(42))).unwrap();
        let b = Topology::generate(6, RandomJoints(StdRng::seed_from_u64(42))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn joints_are_not_biased() {
        let mut knobs = 0usize;
        let mut total = 0usize;
        for seed in 0..50 {
            let t = Topology::generate(9, RandomJoints(StdRng::seed_from_u64(seed))).unwrap();
            for shape in t.shapes() {
                for edge in [shape.right, shape.bottom] {
                    match edge {
                        Edge::Knob => knobs += 1,
                        Edge::Socket => {}
                        Edge::Flat => continue,
                    }
                    total += 1;
                }
            }
        }
        // 50 * 144 joints; a fair coin lands well inside 45-55%.
        let ratio = knobs as f64 / total as f64;
        assert!((0.45..0.55).contains(&ratio), "knob ratio {ratio}");
    }

    #[test]
    fn side_below_two_is_rejected() {
        assert!(matches!(
            Topology::generate(1, ScriptedJoints::new(vec![])),
            Err(PuzzleError::InvalidGridSize { piece_count: 1 })
        ));
        assert!(Topology::generate(0, ScriptedJoints::new(vec![])).is_err());
    }

    #[test]
    fn out_of_range_cell_is_none() {
        let topology = Topology::random(2).unwrap();
        assert!(topology.shape(2, 0).is_none());
        assert!(topology.shape(0, 2).is_none());
    }

    #[test]
    fn empty_script_yields_sockets() {
        let mut source = ScriptedJoints::new(vec![]);
        assert!(!source.next_is_knob());
    }
}

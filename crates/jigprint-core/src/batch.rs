//! Batch orchestration: one decoded image in, one complete piece set out.
//!
//! The batch is all-or-nothing. The piece count is validated before any
//! drawing starts, and the first piece that fails aborts the whole batch
//! so callers never see a partial puzzle.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::decode::SourceImage;
use crate::diagnostics::{SliceDiagnostics, Stopwatch};
use crate::partition::Partition;
use crate::raster::{PieceImage, Rasterizer};
use crate::topology::{JointSource, RandomJoints, Topology};
use crate::types::{PieceShape, PixelRect, PuzzleConfig, PuzzleError};

/// One finished puzzle piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: usize,
    row: usize,
    col: usize,
    shape: PieceShape,
    rect: PixelRect,
    image: PieceImage,
}

impl Piece {
    /// Position in the solved grid, row-major.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    #[must_use]
    pub const fn shape(&self) -> PieceShape {
        self.shape
    }

    /// Source rectangle this piece was cut from, excluding knobs.
    #[must_use]
    pub const fn rect(&self) -> PixelRect {
        self.rect
    }

    #[must_use]
    pub const fn image(&self) -> &PieceImage {
        &self.image
    }
}

/// A complete, interlocked piece set in solved order.
#[derive(Debug, Clone)]
pub struct Puzzle {
    side: usize,
    partition: Partition,
    topology: Topology,
    pieces: Vec<Piece>,
    diagnostics: SliceDiagnostics,
}

impl Puzzle {
    /// Grid side length `N`.
    #[must_use]
    pub const fn side(&self) -> usize {
        self.side
    }

    #[must_use]
    pub const fn partition(&self) -> &Partition {
        &self.partition
    }

    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Pieces in row-major order; `pieces()[i].id() == i`.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    #[must_use]
    pub const fn diagnostics(&self) -> &SliceDiagnostics {
        &self.diagnostics
    }

    pub(crate) fn set_decode_time(&mut self, decode: Duration) {
        self.diagnostics.decode = decode;
        self.diagnostics.total = self.diagnostics.total.saturating_add(decode);
    }
}

/// Slice a decoded image into a puzzle with joints from `joints`.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidGridSize`] or
/// [`PuzzleError::InvalidConfig`] before any drawing if the configuration
/// is invalid, and [`PuzzleError::CanvasAllocation`] or
/// [`PuzzleError::Encode`] if any piece fails to render.
pub fn slice(
    source: &SourceImage,
    config: &PuzzleConfig,
    joints: impl JointSource,
) -> Result<Puzzle, PuzzleError> {
    let total = Stopwatch::start();
    let side = config.validate()?;
    let image = source.dimensions();
    info!(
        side,
        width = image.width,
        height = image.height,
        "slicing puzzle"
    );

    let watch = Stopwatch::start();
    let topology = Topology::generate(side, joints)?;
    let topology_time = watch.elapsed();

    let partition = Partition::new(image, side);
    let watch = Stopwatch::start();
    let mut rasterizer = Rasterizer::new(source, partition.max_cell(), config)?;

    let n = side as usize;
    let mut pieces = Vec::with_capacity(n * n);
    for id in 0..n * n {
        let (row, col) = (id / n, id % n);
        let (Some(rect), Some(shape)) = (partition.cell(row, col), topology.shape(row, col)) else {
            return Err(PuzzleError::InvalidGridSize {
                piece_count: config.piece_count,
            });
        };
        let image = rasterizer.render(rect, shape).inspect_err(|e| {
            debug!(id, error = %e, "piece failed, aborting batch");
        })?;
        trace!(id, row, col, bytes = image.png().len(), "rendered piece");
        pieces.push(Piece {
            id,
            row,
            col,
            shape,
            rect,
            image,
        });
    }
    let rasterize = watch.elapsed();

    let diagnostics = SliceDiagnostics {
        decode: Duration::ZERO,
        topology: topology_time,
        rasterize,
        total: total.elapsed(),
        image,
        piece_count: pieces.len(),
        surface: rasterizer.surface_size(),
        png_bytes: pieces.iter().map(|p| p.image.png().len()).sum(),
    };
    info!(
        pieces = diagnostics.piece_count,
        png_bytes = diagnostics.png_bytes,
        elapsed_ms = diagnostics.total.as_millis(),
        "puzzle ready"
    );

    Ok(Puzzle {
        side: n,
        partition,
        topology,
        pieces,
        diagnostics,
    })
}

/// Slice a decoded image with joints from the thread-local RNG.
///
/// # Errors
///
/// Same as [`slice`].
pub fn slice_random(source: &SourceImage, config: &PuzzleConfig) -> Result<Puzzle, PuzzleError> {
    slice(source, config, RandomJoints(rand::rng()))
}

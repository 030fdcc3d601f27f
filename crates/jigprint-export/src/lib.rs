//! jigprint-export: Pure piece-set serializers (sans-IO)
//!
//! Turns a finished piece set into a display board (SVG) and a printable
//! sheet (HTML). Both embed the piece PNGs as data URLs, so the output is
//! a single self-contained string.

pub mod board;
pub mod print;

pub use board::{BoardMetadata, Placement, placement, to_board_svg};
pub use print::to_print_html;

use jigprint_core::Piece;

/// Errors from the serializers.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A grid side of zero.
    #[error("grid side must be at least 1")]
    EmptyGrid,

    /// The piece list does not fill the grid.
    #[error("expected {expected} pieces for the grid, got {actual}")]
    PieceCountMismatch { expected: usize, actual: usize },

    /// Board cell size was zero, negative, or not finite.
    #[error("cell size must be positive, got {0}")]
    InvalidCellSize(f64),
}

fn check_grid(pieces: &[Piece], side: usize) -> Result<(), ExportError> {
    if side == 0 {
        return Err(ExportError::EmptyGrid);
    }
    let expected = side.saturating_mul(side);
    if pieces.len() != expected {
        return Err(ExportError::PieceCountMismatch {
            expected,
            actual: pieces.len(),
        });
    }
    Ok(())
}

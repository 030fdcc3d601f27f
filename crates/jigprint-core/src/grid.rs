//! Piece count validation.

use crate::types::PuzzleError;

/// Smallest grid side that has interior joints.
pub const MIN_SIDE: u32 = 2;

/// Grid side length `N` for a piece count of `N * N`.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidGridSize`] if `piece_count` is not a
/// perfect square or its root is below [`MIN_SIDE`].
pub fn grid_side(piece_count: u32) -> Result<u32, PuzzleError> {
    let side = piece_count.isqrt();
    if side < MIN_SIDE || side * side != piece_count {
        return Err(PuzzleError::InvalidGridSize { piece_count });
    }
    Ok(side)
}

//! Exact integer partitioning of the source image across the grid.
//!
//! Each axis is split into `N` spans of `floor(total / N)` pixels, and the
//! first `total mod N` spans each take one extra pixel. The spans always
//! sum to the full axis length, so no source pixel is skipped or covered
//! twice regardless of how `total` divides.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, PixelRect};

/// Split `total` pixels into `parts` spans, front-loading the remainder.
///
/// Returns an empty vector when `parts` is zero.
#[must_use]
pub fn split_axis(total: u32, parts: u32) -> Vec<u32> {
    if parts == 0 {
        return Vec::new();
    }
    let base = total / parts;
    let remainder = total % parts;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Column widths and row heights for one image and grid side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    columns: Vec<u32>,
    rows: Vec<u32>,
    column_offsets: Vec<u32>,
    row_offsets: Vec<u32>,
}

impl Partition {
    /// Partition `dimensions` into a `side` x `side` grid.
    #[must_use]
    pub fn new(dimensions: Dimensions, side: u32) -> Self {
        let columns = split_axis(dimensions.width, side);
        let rows = split_axis(dimensions.height, side);
        let column_offsets = prefix_offsets(&columns);
        let row_offsets = prefix_offsets(&rows);
        Self {
            columns,
            rows,
            column_offsets,
            row_offsets,
        }
    }

    /// Number of cells along each axis.
    #[must_use]
    pub fn side(&self) -> usize {
        self.columns.len()
    }

    /// Column widths, left to right.
    #[must_use]
    pub fn column_widths(&self) -> &[u32] {
        &self.columns
    }

    /// Row heights, top to bottom.
    #[must_use]
    pub fn row_heights(&self) -> &[u32] {
        &self.rows
    }

    /// Widest column and tallest row (always the first ones).
    #[must_use]
    pub fn max_cell(&self) -> Dimensions {
        Dimensions {
            width: self.columns.first().copied().unwrap_or(0),
            height: self.rows.first().copied().unwrap_or(0),
        }
    }

    /// Source rectangle of the cell at `(row, col)`.
    ///
    /// Returns `None` if the cell lies outside the grid.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<PixelRect> {
        Some(PixelRect {
            x: *self.column_offsets.get(col)?,
            y: *self.row_offsets.get(row)?,
            width: *self.columns.get(col)?,
            height: *self.rows.get(row)?,
        })
    }
}

fn prefix_offsets(spans: &[u32]) -> Vec<u32> {
    spans
        .iter()
        .scan(0u32, |acc, &span| {
            let start = *acc;
            *acc += span;
            Some(start)
        })
        .collect()
}

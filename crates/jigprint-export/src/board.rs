//! SVG display board.
//!
//! Lays the pieces out in solved order on a grid of equal square cells,
//! using the [`svg`] crate for document construction. Piece `i` sits in
//! column `i % N`, row `i / N`. Each piece image is drawn larger than its
//! cell and shifted up and left by its padding, so knobs overflow into
//! the neighbouring cells instead of being clipped at the cell boundary.

use svg::Document;
use svg::node::Text;
use svg::node::element::{Description, Group, Image, Title};

use jigprint_core::Piece;

use crate::ExportError;

/// Metadata to embed in the board document.
#[derive(Debug, Clone, Default)]
pub struct BoardMetadata<'a> {
    /// Document title, emitted as `<title>`. Typically the prompt.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Placement of one piece image on the board, in board units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Where the image of `piece` is drawn on a board of `cell_size` cells.
///
/// The image is scaled so the unpadded piece fills exactly one cell; the
/// padding then extends past the cell on every side.
#[must_use]
pub fn placement(piece: &Piece, side: usize, cell_size: f64) -> Placement {
    #[allow(clippy::cast_precision_loss)]
    let (col, row) = ((piece.id() % side) as f64, (piece.id() / side) as f64);
    let rect = piece.rect();
    let image = piece.image();
    let scale_x = cell_size / f64::from(rect.width.max(1));
    let scale_y = cell_size / f64::from(rect.height.max(1));
    let padding = image.padding();
    let size = image.size();
    Placement {
        x: col.mul_add(cell_size, -f64::from(padding.x) * scale_x),
        y: row.mul_add(cell_size, -f64::from(padding.y) * scale_y),
        width: f64::from(size.width) * scale_x,
        height: f64::from(size.height) * scale_y,
    }
}

/// Serialize pieces into a board SVG.
///
/// # Errors
///
/// Returns [`ExportError::EmptyGrid`] if `side` is zero,
/// [`ExportError::PieceCountMismatch`] if `pieces.len() != side * side`,
/// and [`ExportError::InvalidCellSize`] if `cell_size` is not finite and
/// positive.
///
/// # Examples
///
/// ```no_run
/// # fn demo(puzzle: &jigprint_core::Puzzle) -> Result<(), jigprint_export::ExportError> {
/// use jigprint_export::{BoardMetadata, to_board_svg};
///
/// let svg = to_board_svg(puzzle.pieces(), puzzle.side(), 100.0, &BoardMetadata::default())?;
/// assert!(svg.contains("<image"));
/// # Ok(())
/// # }
/// ```
pub fn to_board_svg(
    pieces: &[Piece],
    side: usize,
    cell_size: f64,
    metadata: &BoardMetadata<'_>,
) -> Result<String, ExportError> {
    crate::check_grid(pieces, side)?;
    if !cell_size.is_finite() || cell_size <= 0.0 {
        return Err(ExportError::InvalidCellSize(cell_size));
    }

    #[allow(clippy::cast_precision_loss)]
    let extent = side as f64 * cell_size;
    let mut doc = Document::new()
        .set("width", extent)
        .set("height", extent)
        .set("viewBox", format!("0 0 {extent} {extent}"))
        .set("overflow", "visible");

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    let mut board = Group::new().set("id", "pieces");
    for piece in pieces {
        let p = placement(piece, side, cell_size);
        let image = Image::new()
            .set("x", p.x)
            .set("y", p.y)
            .set("width", p.width)
            .set("height", p.height)
            .set("href", piece.image().data_url())
            .set("data-id", piece.id());
        board = board.add(image);
    }
    doc = doc.add(board);

    // The svg crate omits the XML declaration, so we prepend it.
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"))
}

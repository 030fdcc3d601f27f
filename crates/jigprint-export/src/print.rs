//! Printable HTML sheet.
//!
//! One self-contained document: the prompt and piece count as a header,
//! followed by every piece image at its native padded size. Pieces are
//! never split across printed pages.

use std::fmt::Write;

use jigprint_core::Piece;

use crate::ExportError;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1cm; }
h1 { font-size: 14pt; }
.pieces { display: flex; flex-wrap: wrap; gap: 4mm; }
.piece { margin: 0; break-inside: avoid; page-break-inside: avoid; }
.piece img { display: block; }
.piece figcaption { font-size: 8pt; text-align: center; }
@media print { .no-print { display: none; } }
";

/// Escape the five XML special characters for embedding in HTML text
/// and attribute values.
fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Render the print sheet for `pieces`.
///
/// `prompt` is escaped before embedding.
///
/// # Errors
///
/// Returns [`ExportError::EmptyGrid`] if `side` is zero and
/// [`ExportError::PieceCountMismatch`] if `pieces.len() != side * side`.
pub fn to_print_html(pieces: &[Piece], side: usize, prompt: &str) -> Result<String, ExportError> {
    crate::check_grid(pieces, side)?;

    let prompt = xml_escape(prompt);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{prompt}</title>");
    let _ = writeln!(out, "<style>\n{STYLE}</style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "<header>");
    let _ = writeln!(out, "<h1>{prompt}</h1>");
    let _ = writeln!(out, "<p>{} pieces ({side} x {side})</p>", pieces.len());
    let _ = writeln!(
        out,
        "<p class=\"no-print\">Print this page, then cut along the lines.</p>"
    );
    let _ = writeln!(out, "</header>");
    let _ = writeln!(out, "<main class=\"pieces\">");
    for piece in pieces {
        let image = piece.image();
        let size = image.size();
        let _ = writeln!(out, "<figure class=\"piece\">");
        let _ = writeln!(
            out,
            "<img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"piece {}\">",
            image.data_url(),
            size.width,
            size.height,
            piece.id() + 1,
        );
        let _ = writeln!(
            out,
            "<figcaption>{} / {}</figcaption>",
            piece.id() + 1,
            pieces.len()
        );
        let _ = writeln!(out, "</figure>");
    }
    let _ = writeln!(out, "</main>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    Ok(out)
}

//! jigprint-core: jigsaw topology and piece rasterization (sans-IO).
//!
//! Slices a square image into an N x N interlocking puzzle:
//! piece count validation -> exact pixel partition -> random joint
//! topology -> per-piece curved outline, clipped fill and cut-line
//! stroke -> PNG.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory byte
//! slices and returns structured data. Image generation is reached only
//! through the [`ImageGenerator`] trait; file and network access belong
//! to the caller.

pub mod batch;
pub mod decode;
pub mod diagnostics;
pub mod generate;
pub mod grid;
pub mod outline;
pub mod partition;
pub mod raster;
pub mod session;
pub mod topology;
pub mod types;

pub use batch::{Piece, Puzzle, slice, slice_random};
pub use decode::{SourceImage, decode_image};
pub use diagnostics::SliceDiagnostics;
pub use generate::{GenerationError, ImageGenerator, PromptError, decode_payload};
pub use grid::grid_side;
pub use partition::Partition;
pub use raster::{Padding, PieceImage};
pub use session::{Completion, SliceSession, SliceTicket, SourceKey};
pub use topology::{JointSource, RandomJoints, ScriptedJoints, Topology};
pub use types::{
    Dimensions, Edge, KNOB_RATIO, PIECE_COUNT_MENU, PieceShape, PixelRect, Point, PuzzleConfig,
    PuzzleError, RgbaImage,
};

use diagnostics::Stopwatch;

/// Decode `image_bytes` and slice it with a random topology.
///
/// The piece count is validated before the image is decoded.
///
/// # Errors
///
/// Returns [`PuzzleError::InvalidGridSize`] for a non-square piece count,
/// [`PuzzleError::EmptyInput`] or [`PuzzleError::ImageLoad`] if the image
/// cannot be decoded, and any error from [`slice`].
pub fn process(image_bytes: &[u8], config: &PuzzleConfig) -> Result<Puzzle, PuzzleError> {
    process_with(image_bytes, config, RandomJoints(rand::rng()))
}

/// Like [`process`] but with joints from `joints`.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_with(
    image_bytes: &[u8],
    config: &PuzzleConfig,
    joints: impl JointSource,
) -> Result<Puzzle, PuzzleError> {
    config.validate()?;
    let watch = Stopwatch::start();
    let source = decode_image(image_bytes)?;
    let decode = watch.elapsed();
    let mut puzzle = slice(&source, config, joints)?;
    puzzle.set_decode_time(decode);
    Ok(puzzle)
}

/// Generate an image for `prompt` and slice it.
///
/// # Errors
///
/// Returns [`PromptError::Generation`] if the generator fails (no slicing
/// is attempted) and [`PromptError::Slice`] if slicing fails.
pub fn puzzle_from_prompt(
    generator: &impl ImageGenerator,
    prompt: &str,
    config: &PuzzleConfig,
) -> Result<Puzzle, PromptError> {
    puzzle_from_prompt_with(generator, prompt, config, RandomJoints(rand::rng()))
}

/// Like [`puzzle_from_prompt`] but with joints from `joints`.
///
/// # Errors
///
/// Same as [`puzzle_from_prompt`].
pub fn puzzle_from_prompt_with(
    generator: &impl ImageGenerator,
    prompt: &str,
    config: &PuzzleConfig,
    joints: impl JointSource,
) -> Result<Puzzle, PromptError> {
    config.validate()?;
    tracing::info!(prompt, "requesting image");
    let image_bytes = generator.generate(prompt)?;
    Ok(process_with(&image_bytes, config, joints)?)
}

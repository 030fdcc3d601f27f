//! Regeneration bookkeeping for an interactive front end.
//!
//! A new slice is started whenever the source image or the piece count
//! changes. Slicing may complete after a newer request has already been
//! started; such stale results are dropped. The newest request always owns
//! the "slicing" indicator, and the previous piece set is discarded as soon
//! as a new request begins, so the visible state is either a complete
//! puzzle for the latest inputs or nothing.

use std::hash::Hasher;

use siphasher::sip::SipHasher13;
use tracing::debug;

use crate::batch::Puzzle;
use crate::types::{PuzzleConfig, PuzzleError};

/// Identifies the inputs a puzzle was sliced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey {
    digest: u64,
    piece_count: u32,
}

impl SourceKey {
    /// Key for `image_bytes` sliced into `piece_count` pieces.
    #[must_use]
    pub fn new(image_bytes: &[u8], piece_count: u32) -> Self {
        let mut hasher = SipHasher13::new();
        hasher.write(image_bytes);
        Self {
            digest: hasher.finish(),
            piece_count,
        }
    }

    #[must_use]
    pub const fn piece_count(&self) -> u32 {
        self.piece_count
    }
}

/// Handle for one started slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceTicket {
    generation: u64,
    key: SourceKey,
}

impl SliceTicket {
    #[must_use]
    pub const fn key(&self) -> SourceKey {
        self.key
    }
}

/// What [`SliceSession::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The puzzle is now the current piece set.
    Applied,
    /// The slice failed; no piece set is shown.
    Failed,
    /// A newer slice was started; the result was dropped.
    Stale,
}

/// Tracks the latest slice request and its outcome.
#[derive(Debug, Default)]
pub struct SliceSession {
    generation: u64,
    in_flight: bool,
    key: Option<SourceKey>,
    puzzle: Option<Puzzle>,
    last_error: Option<PuzzleError>,
}

impl SliceSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether slicing `image_bytes` into `piece_count` pieces differs
    /// from the most recently started request.
    #[must_use]
    pub fn needs_slicing(&self, image_bytes: &[u8], piece_count: u32) -> bool {
        self.key != Some(SourceKey::new(image_bytes, piece_count))
    }

    /// Start a new slice, superseding any in-flight one.
    ///
    /// The current piece set and error are cleared immediately.
    pub fn begin(&mut self, image_bytes: &[u8], piece_count: u32) -> SliceTicket {
        self.generation += 1;
        let key = SourceKey::new(image_bytes, piece_count);
        self.key = Some(key);
        self.in_flight = true;
        self.puzzle = None;
        self.last_error = None;
        debug!(generation = self.generation, piece_count, "slice started");
        SliceTicket {
            generation: self.generation,
            key,
        }
    }

    /// Record the outcome of the slice identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: SliceTicket,
        result: Result<Puzzle, PuzzleError>,
    ) -> Completion {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale slice result"
            );
            return Completion::Stale;
        }
        self.in_flight = false;
        match result {
            Ok(puzzle) => {
                self.puzzle = Some(puzzle);
                Completion::Applied
            }
            Err(err) => {
                self.last_error = Some(err);
                Completion::Failed
            }
        }
    }

    /// Begin, slice synchronously, and complete in one step.
    pub fn run(&mut self, image_bytes: &[u8], config: &PuzzleConfig) -> Completion {
        let ticket = self.begin(image_bytes, config.piece_count);
        let result = crate::process(image_bytes, config);
        self.complete(ticket, result)
    }

    /// `true` while the most recently started slice has not completed.
    #[must_use]
    pub const fn is_slicing(&self) -> bool {
        self.in_flight
    }

    /// The current complete piece set, if any.
    #[must_use]
    pub const fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// Error from the most recent completed slice, if it failed.
    #[must_use]
    pub const fn last_error(&self) -> Option<&PuzzleError> {
        self.last_error.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32, shade: u8) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn config(piece_count: u32) -> PuzzleConfig {
        PuzzleConfig {
            piece_count,
            ..PuzzleConfig::default()
        }
    }

    #[test]
    fn newest_request_wins() {
        let image = png(40, 40, 10);
        let mut session = SliceSession::new();

        let first = session.begin(&image, 4);
        let second = session.begin(&image, 16);
        assert!(session.is_slicing());

        // The older slice finishes late and is ignored.
        let stale = crate::process(&image, &config(4));
        assert_eq!(session.complete(first, stale), Completion::Stale);
        assert!(session.is_slicing());
        assert!(session.puzzle().is_none());

        let fresh = crate::process(&image, &config(16));
        assert_eq!(session.complete(second, fresh), Completion::Applied);
        assert!(!session.is_slicing());
        assert_eq!(session.puzzle().unwrap().pieces().len(), 16);
    }

    #[test]
    fn stale_result_after_newest_completed_is_ignored() {
        let image = png(40, 40, 10);
        let mut session = SliceSession::new();
        let first = session.begin(&image, 4);
        let second = session.begin(&image, 9);
        session.complete(second, crate::process(&image, &config(9)));
        let outcome = session.complete(first, crate::process(&image, &config(4)));
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(session.puzzle().unwrap().side(), 3);
    }

    #[test]
    fn begin_discards_previous_puzzle() {
        let image = png(40, 40, 10);
        let mut session = SliceSession::new();
        assert_eq!(session.run(&image, &config(4)), Completion::Applied);
        assert!(session.puzzle().is_some());
        let _ticket = session.begin(&png(40, 40, 200), 4);
        assert!(session.puzzle().is_none());
    }

    #[test]
    fn failure_leaves_no_pieces() {
        let image = png(40, 40, 10);
        let mut session = SliceSession::new();
        assert_eq!(session.run(&image, &config(10)), Completion::Failed);
        assert!(session.puzzle().is_none());
        assert!(!session.is_slicing());
        assert!(matches!(
            session.last_error(),
            Some(PuzzleError::InvalidGridSize { piece_count: 10 })
        ));
    }

    #[test]
    fn decode_failure_is_reported() {
        let mut session = SliceSession::new();
        assert_eq!(session.run(b"not an image", &config(4)), Completion::Failed);
        assert!(matches!(
            session.last_error(),
            Some(PuzzleError::ImageLoad(_))
        ));
    }

    #[test]
    fn triggers_are_image_and_piece_count() {
        let a = png(40, 40, 10);
        let b = png(40, 40, 11);
        let mut session = SliceSession::new();
        assert!(session.needs_slicing(&a, 4));
        let _ticket = session.begin(&a, 4);
        assert!(!session.needs_slicing(&a, 4));
        assert!(session.needs_slicing(&a, 9));
        assert!(session.needs_slicing(&b, 4));
    }

    #[test]
    fn source_key_is_deterministic() {
        assert_eq!(SourceKey::new(b"abc", 4), SourceKey::new(b"abc", 4));
        assert_ne!(SourceKey::new(b"abc", 4), SourceKey::new(b"abd", 4));
        assert_eq!(SourceKey::new(b"abc", 9).piece_count(), 9);
    }
}

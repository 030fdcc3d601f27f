//! Prompt-to-image collaborator interface.
//!
//! The image service itself lives outside this crate. Implementations of
//! [`ImageGenerator`] return raw image bytes for a prompt; services that
//! answer with base64 (optionally as a `data:` URL) can hand their payload
//! to [`decode_payload`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Errors from the image generation service.
///
/// Kept separate from [`PuzzleError`](crate::PuzzleError) so callers can
/// tell a failed generation apart from a failed slice.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The service reported an error.
    #[error("image generation failed: {0}")]
    Upstream(String),

    /// The service answered without an image.
    #[error("image generation returned no image")]
    NoImage,

    /// The returned payload was not valid base64.
    #[error("generated image payload is not valid base64: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
}

/// Failure of the full prompt-to-puzzle flow.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// The image could not be generated; slicing never started.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The generated image could not be sliced.
    #[error(transparent)]
    Slice(#[from] crate::PuzzleError),
}

/// Produces one square raster image for a free-text prompt.
pub trait ImageGenerator {
    /// Generate an image and return its encoded bytes (PNG, JPEG, ...).
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the service fails or returns
    /// nothing usable.
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError>;
}

impl<T: ImageGenerator + ?Sized> ImageGenerator for &T {
    fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        (**self).generate(prompt)
    }
}

/// Decode a base64 image payload, with or without a `data:` URL prefix.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`GenerationError::NoImage`] for an empty payload and
/// [`GenerationError::InvalidPayload`] for malformed base64.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, GenerationError> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or(GenerationError::NoImage)?,
        None => payload,
    };
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(GenerationError::NoImage);
    }
    let bytes = STANDARD.decode(encoded)?;
    if bytes.is_empty() {
        return Err(GenerationError::NoImage);
    }
    Ok(bytes)
}

//! Batch diagnostics: per-phase timing and output sizes.
//!
//! Timestamps are captured via the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Metrics collected while slicing one puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceDiagnostics {
    /// Image decode (zero when slicing an already decoded source).
    #[serde(with = "duration_serde")]
    pub decode: Duration,
    /// Joint generation.
    #[serde(with = "duration_serde")]
    pub topology: Duration,
    /// Outline, fill, stroke and PNG encoding for every piece.
    #[serde(with = "duration_serde")]
    pub rasterize: Duration,
    /// Wall-clock duration of the whole batch.
    #[serde(with = "duration_serde")]
    pub total: Duration,
    /// Source image size.
    pub image: Dimensions,
    /// Number of pieces produced.
    pub piece_count: usize,
    /// Size of the shared drawing surface after the batch.
    pub surface: Dimensions,
    /// Sum of all encoded piece PNG sizes.
    pub png_bytes: usize,
}

/// Measures elapsed time since construction.
pub(crate) struct Stopwatch(web_time::Instant);

impl Stopwatch {
    pub(crate) fn start() -> Self {
        Self(web_time::Instant::now())
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

//! Per-frame pipeline output

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::imaging::correlation::MagnitudeMatrix;
use crate::imaging::imager::SkyImage;

/// Everything the pipeline derives from one frame, fanned out to every
/// sink.
///
/// Cheap to clone: the payloads sit behind `Arc`s, so the repeater hands
/// every sink a reference-counted view of the same buffers.
#[derive(Debug, Clone)]
pub struct FrameProduct {
    /// Integration start, UTC-normalized.
    pub timestamp: DateTime<Utc>,
    /// Integration start as raw Unix seconds from the wire.
    pub unix_seconds: f64,
    /// Reconstructed sky image.
    pub image: Arc<SkyImage>,
    /// Display-oriented correlation magnitude map.
    pub correlation: Arc<MagnitudeMatrix>,
    /// Per-channel power row for the waterfall.
    pub channels: Arc<Vec<f32>>,
}

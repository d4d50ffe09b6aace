//! Gridding and imaging engine
//!
//! Turns one correlator frame into a sky image:
//!
//! ```text
//! VisibilityMatrix ──► correlation_matrix ──► grid ──► Imager ──► SkyImage
//!  [chan][baseline]     [ant][ant] Hermitian   UV plane   2D FFT
//! ```
//!
//! [`AntennaGeometry`] supplies the per-pair baseline (U, V) projections;
//! it is loaded once at startup and shared read-only by every compute
//! worker, as are the FFT plan and the index permutation.

pub mod correlation;
pub mod geometry;
pub mod gridder;
pub mod imager;

pub use correlation::{
    apply_gains, channel_power, correlation_matrix, CorrelationMatrix, MagnitudeMatrix,
};
pub use geometry::AntennaGeometry;
pub use gridder::{grid, UvGrid};
pub use imager::{Imager, SkyImage};

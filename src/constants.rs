//! Fixed observation layout constants
//!
//! The correlator emits one frame per second for a fixed array configuration:
//! 288 dual-polarization antennas, 63 frequency channels, and the full lower
//! triangle of antenna pairs. Everything here follows from that layout.

/// Sky image resolution in pixels (images are square).
pub const IMAGE_RES: usize = 256;

/// Speed of light in m/s.
pub const C_MS: f64 = 299_792_458.0;

/// Number of antennas in the array.
pub const NUM_ANTS: usize = 288;

/// Number of baselines: the lower triangle including self-correlations.
pub const NUM_BSLN: usize = NUM_ANTS * (NUM_ANTS + 1) / 2;

/// Number of frequency channels per frame.
pub const NUM_CHAN: usize = 63;

/// Number of polarizations interleaved in the sample stream.
pub const NUM_POLS: usize = 2;

/// Frame header block size in bytes. Only the first 24 bytes carry data,
/// the remainder is padding.
pub const LEN_HDR: usize = 512;

/// Frame body size in bytes: complex64 samples for every
/// (baseline, polarization, channel) combination.
pub const LEN_BDY: usize = NUM_BSLN * NUM_POLS * NUM_CHAN * 8;

/// Magic constant opening every frame header.
pub const HDR_MAGIC: u32 = 0x3B98_F002;

/// Default central observation frequency in Hz.
pub const FRQ: f64 = 58_398_437.5;

/// Subband width in Hz; the disk artifact band index is
/// `floor(frequency / SUBBAND_WIDTH_HZ)`.
pub const SUBBAND_WIDTH_HZ: f64 = 195_312.5;

/// Depth of the rolling sink histories (lag ring, waterfall columns).
pub const HISTORY_LEN: usize = 60;

/// Video frames written to the encoder per received image; one image holds
/// one second of output video.
pub const FPS: u32 = 25;

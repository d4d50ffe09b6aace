//! Visibility frame protocol
//!
//! The correlator emits fixed-layout binary frames, one per integration:
//!
//! ```text
//! offset  size              field
//! ------  ----------------  ---------------------------------
//!      0  4                 magic constant (little-endian)
//!      4  4                 reserved
//!      8  8                 start timestamp (f64, Unix seconds)
//!     16  8                 end timestamp (f64, Unix seconds)
//!     24  ..LEN_HDR         padding, ignored
//! LEN_HDR LEN_BDY           complex64 sample stream
//! ```
//!
//! Frames arrive over one of two transports with different short-read
//! policies: a socket read loops until the block is filled (a zero-length
//! receive means the peer closed), while a file read that cannot fill the
//! block means playback reached the end of the recording.
//!
//! The flat sample stream is ordered by the GPU correlator as
//! `(baseline, channel, polarization)`; [`IndexMap`] precomputes the gather
//! permutation that reshapes it into a `[channel][baseline]` matrix for one
//! polarization.

pub mod frame;
pub mod index;
pub mod reader;
pub mod transport;

pub use frame::{Frame, FrameHeader};
pub use index::{IndexMap, VisibilityMatrix};
pub use reader::FrameReader;
pub use transport::{FileTransport, SocketTransport, Transport};

//! Downstream consumers
//!
//! Two independent terminal branches hang off the repeater, each with its
//! own queue and its own private state:
//!
//! - [`DiskWriter`] archives five rendered artifacts per product and keeps
//!   the rolling histories (lag ring, channel waterfall, previous image)
//!   they are derived from.
//! - [`StreamEncoder`] owns the external video-encoder subprocess and
//!   paces raw grayscale frames into it at a one-second duty cycle.
//!
//! The sinks never share mutable state with each other or with the
//! pipeline, so neither needs locking.

pub mod disk;
pub mod render;
pub mod stream;

pub use disk::{spawn_disk_sink, DiskWriter};
pub use stream::{spawn_stream_sink, StreamEncoder};

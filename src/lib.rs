//! # allsky-rs
//!
//! Real-time all-sky imaging server for radio interferometer visibility
//! streams.
//!
//! The correlator emits one binary frame per second: a fixed header plus
//! the complex visibilities of every (baseline, polarization, channel)
//! combination. This crate decodes those frames from a file or a live TCP
//! socket, reconstructs the Hermitian antenna correlation matrix, images
//! it onto the sky through a gridding + 2D-FFT pipeline, and fans the
//! results out to a disk archive and a live video stream.
//!
//! ```text
//! file / TCP socket
//!        │
//!        ▼
//!   FrameReader ──► IndexMap gather ──► correlation matrix
//!                                             │
//!                                    ┌────────┴────────┐
//!                                    ▼                 ▼
//!                                UV gridder      channel power /
//!                                    │            magnitude map
//!                                    ▼                 │
//!                                2D FFT image          │
//!                                    └────────┬────────┘
//!                                             ▼
//!                               Scheduler (parallel workers)
//!                                             │
//!                                        repeater
//!                                     ┌───────┴───────┐
//!                                     ▼               ▼
//!                                disk sink       stream sink
//!                              (PNG + symlink)  (ffmpeg → RTMP)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use allsky_rs::{ServerConfig, VisServer};
//!
//! # async fn example() -> allsky_rs::Result<()> {
//! let config = ServerConfig::default()
//!     .antenna_table("lba_outer.dat")
//!     .media_root("/var/lib/allsky")
//!     .stream_destination("rtmp://a.rtmp.youtube.com/live2/SECRET");
//!
//! VisServer::new(config).run().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Ordering
//!
//! Compute workers run in parallel and finish in whatever order the
//! machine schedules them, so products can reach the sinks out of frame
//! order. Every product carries its frame timestamp; the disk sink names
//! artifacts by it and never moves its `latest` links backwards.

pub mod constants;
pub mod error;
pub mod imaging;
pub mod pipeline;
pub mod protocol;
pub mod server;
pub mod sink;
pub mod stats;

pub use error::{Error, Result};
pub use server::{ServerConfig, VisServer};

//! Server assembly
//!
//! [`VisServer`] wires the whole system together: transport → frame
//! reader → scheduler → repeater → sinks, configured through
//! [`ServerConfig`]. Socket mode listens for one correlator connection at
//! a time; file mode replays a recording and drains the pipeline.

pub mod config;
pub mod listener;

pub use config::ServerConfig;
pub use listener::VisServer;

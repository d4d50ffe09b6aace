//! Pipeline counters
//!
//! Shared atomic counters incremented at each pipeline stage. One
//! instance is cloned (via `Arc`) into the listener, the compute workers,
//! the repeater, and both sinks.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for the running pipeline.
#[derive(Debug, Default)]
pub struct PipelineStats {
    frames_received: AtomicU64,
    products_computed: AtomicU64,
    products_repeated: AtomicU64,
    disk_writes: AtomicU64,
    stream_sends: AtomicU64,
}

impl PipelineStats {
    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_computed(&self) {
        self.products_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_repeated(&self) {
        self.products_repeated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disk_write(&self) {
        self.disk_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_send(&self) {
        self.stream_sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            products_computed: self.products_computed.load(Ordering::Relaxed),
            products_repeated: self.products_repeated.load(Ordering::Relaxed),
            disk_writes: self.disk_writes.load(Ordering::Relaxed),
            stream_sends: self.stream_sends.load(Ordering::Relaxed),
        }
    }
}

/// A consistent-enough view of the counters for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub frames_received: u64,
    pub products_computed: u64,
    pub products_repeated: u64,
    pub disk_writes: u64,
    pub stream_sends: u64,
}

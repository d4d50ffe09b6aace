//! Scheduler and fan-out repeater
//!
//! [`Scheduler::submit`] hands each frame to a semaphore-bounded blocking
//! worker; finished [`FrameProduct`]s land on a single internal queue. A
//! dedicated repeater task drains that queue and re-publishes every
//! product to each queue registered with [`Scheduler::subscribe`]:
//! single-producer/multi-consumer fan-out over unbounded channels.
//!
//! Workers complete in whatever order the machine schedules them, so
//! products can reach the sinks out of frame order. No backpressure: a
//! slow sink accumulates memory in its queue.

use std::mem;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::pipeline::compute::FrameProcessor;
use crate::pipeline::product::FrameProduct;
use crate::protocol::frame::Frame;
use crate::stats::PipelineStats;

/// Owns the compute pool and the repeater.
pub struct Scheduler {
    processor: Arc<FrameProcessor>,
    stats: Arc<PipelineStats>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    repeat_tx: UnboundedSender<FrameProduct>,
    repeat_rx: Option<UnboundedReceiver<FrameProduct>>,
    pending_sinks: Vec<UnboundedSender<FrameProduct>>,
    repeater: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(
        processor: FrameProcessor,
        max_in_flight: usize,
        stats: Arc<PipelineStats>,
    ) -> Self {
        let (repeat_tx, repeat_rx) = mpsc::unbounded_channel();
        Self {
            processor: Arc::new(processor),
            stats,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            repeat_tx,
            repeat_rx: Some(repeat_rx),
            pending_sinks: Vec::new(),
            repeater: None,
        }
    }

    /// Register a downstream queue. Must be called before [`start`].
    ///
    /// [`start`]: Scheduler::start
    pub fn subscribe(&mut self) -> UnboundedReceiver<FrameProduct> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.repeat_rx.is_none() {
            tracing::warn!("subscribe after start: queue will never receive products");
        } else {
            self.pending_sinks.push(tx);
        }
        rx
    }

    /// Spawn the repeater over all registered queues. Idempotent.
    pub fn start(&mut self) {
        let Some(mut rx) = self.repeat_rx.take() else {
            return;
        };
        let sinks = mem::take(&mut self.pending_sinks);
        let stats = Arc::clone(&self.stats);

        self.repeater = Some(tokio::spawn(async move {
            tracing::debug!(sinks = sinks.len(), "repeater starting");
            while let Some(product) = rx.recv().await {
                tracing::trace!(timestamp = %product.timestamp, "repeating product");
                for sink in &sinks {
                    // A sink that went away just stops receiving.
                    let _ = sink.send(product.clone());
                }
                stats.record_repeated();
            }
            tracing::debug!("repeater drained");
        }));
    }

    /// Dispatch one frame to the compute pool.
    ///
    /// Suspends while all workers are busy; this is the only bounded stage
    /// of the pipeline.
    pub async fn submit(&self, frame: Frame) {
        let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
            return;
        };
        let processor = Arc::clone(&self.processor);
        let stats = Arc::clone(&self.stats);
        let tx = self.repeat_tx.clone();

        tokio::task::spawn_blocking(move || {
            let product = processor.process(&frame);
            stats.record_computed();
            let _ = tx.send(product);
            drop(permit);
        });
    }

    /// Wait for in-flight compute to finish, then close the repeat queue
    /// so the repeater and the sinks drain and stop.
    pub async fn shutdown(self) {
        let Scheduler {
            permits,
            max_in_flight,
            repeat_tx,
            repeater,
            ..
        } = self;

        if let Ok(all) = permits.acquire_many(max_in_flight as u32).await {
            drop(all);
        }
        drop(repeat_tx);
        if let Some(handle) = repeater {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex32;

    use super::*;
    use crate::pipeline::compute::tests::{toy_frame, toy_processor};

    #[tokio::test]
    async fn fan_out_reaches_every_subscriber() {
        let stats = Arc::new(PipelineStats::default());
        let mut scheduler = Scheduler::new(toy_processor(), 2, Arc::clone(&stats));
        let mut first = scheduler.subscribe();
        let mut second = scheduler.subscribe();
        scheduler.start();

        for i in 0..3 {
            scheduler
                .submit(toy_frame(1000.0 + i as f64, Complex32::new(1.0, 0.0)))
                .await;
        }
        scheduler.shutdown().await;

        let mut first_stamps = Vec::new();
        while let Some(product) = first.recv().await {
            first_stamps.push(product.unix_seconds);
        }
        let mut second_stamps = Vec::new();
        while let Some(product) = second.recv().await {
            second_stamps.push(product.unix_seconds);
        }

        // Completion order is unspecified, but every product reaches
        // every queue.
        first_stamps.sort_by(f64::total_cmp);
        let mut sorted_second = second_stamps.clone();
        sorted_second.sort_by(f64::total_cmp);
        assert_eq!(first_stamps, vec![1000.0, 1001.0, 1002.0]);
        assert_eq!(sorted_second, vec![1000.0, 1001.0, 1002.0]);

        assert_eq!(stats.snapshot().products_computed, 3);
        assert_eq!(stats.snapshot().products_repeated, 3);
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_compute() {
        let stats = Arc::new(PipelineStats::default());
        let mut scheduler = Scheduler::new(toy_processor(), 1, Arc::clone(&stats));
        let mut rx = scheduler.subscribe();
        scheduler.start();

        scheduler
            .submit(toy_frame(1.0, Complex32::new(1.0, 0.0)))
            .await;
        scheduler.shutdown().await;

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn subscribe_after_start_yields_a_dead_queue() {
        let stats = Arc::new(PipelineStats::default());
        let mut scheduler = Scheduler::new(toy_processor(), 1, stats);
        scheduler.start();
        let mut late = scheduler.subscribe();

        scheduler
            .submit(toy_frame(1.0, Complex32::new(1.0, 0.0)))
            .await;
        scheduler.shutdown().await;

        assert!(late.recv().await.is_none());
    }
}

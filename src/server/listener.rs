//! Visibility server
//!
//! Binds the listen address, accepts one correlator connection at a time,
//! and pumps decoded frames into the pipeline. When the peer disconnects
//! the server returns to accepting; a corrupt stream (bad magic) is fatal.
//! `run_file` replays a recorded stream instead and drains the pipeline
//! when the recording ends.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::constants::{NUM_ANTS, NUM_BSLN, NUM_CHAN, NUM_POLS};
use crate::error::{ProtocolError, Result};
use crate::imaging::geometry::AntennaGeometry;
use crate::pipeline::compute::FrameProcessor;
use crate::pipeline::scheduler::Scheduler;
use crate::protocol::index::IndexMap;
use crate::protocol::reader::FrameReader;
use crate::protocol::transport::{FileTransport, SocketTransport, Transport};
use crate::server::config::ServerConfig;
use crate::sink::disk::{spawn_disk_sink, DiskWriter};
use crate::sink::stream::spawn_stream_sink;
use crate::stats::PipelineStats;

/// The assembled pipeline: the scheduler plus its sink workers.
struct Pipeline {
    scheduler: Scheduler,
    sinks: Vec<JoinHandle<()>>,
}

/// Visibility imaging server.
pub struct VisServer {
    config: ServerConfig,
    stats: Arc<PipelineStats>,
}

impl VisServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            stats: Arc::new(PipelineStats::default()),
        }
    }

    /// Shared pipeline counters, for periodic logging by the caller.
    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Run in socket mode.
    ///
    /// Accepts a single correlator connection at a time and reads frames
    /// until the peer closes, then goes back to accepting. Runs until a
    /// fatal error (corrupt stream) or process termination.
    pub async fn run(&self) -> Result<()> {
        let pipeline = self.build_pipeline()?;
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "visibility server listening");

        loop {
            let (socket, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            tracing::info!(peer = %peer, "correlator connected");

            let reader = FrameReader::new(SocketTransport::new(socket));
            self.pump(reader, &pipeline.scheduler).await?;
            tracing::info!(peer = %peer, "correlator disconnected");
        }
    }

    /// Replay a recorded visibility stream, then drain the pipeline.
    pub async fn run_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let pipeline = self.build_pipeline()?;
        let path = path.as_ref();

        let reader = FrameReader::new(FileTransport::open(path).await?);
        tracing::info!(path = %path.display(), "replaying recorded stream");
        let outcome = self.pump(reader, &pipeline.scheduler).await;

        let Pipeline { scheduler, sinks } = pipeline;
        scheduler.shutdown().await;
        for sink in sinks {
            let _ = sink.await;
        }
        tracing::info!(stats = ?self.stats.snapshot(), "playback finished");
        outcome
    }

    /// Read frames until the stream's end condition, dispatching each into
    /// the compute pool. Other protocol errors propagate.
    async fn pump<T: Transport>(
        &self,
        mut reader: FrameReader<T>,
        scheduler: &Scheduler,
    ) -> Result<()> {
        loop {
            match reader.read_frame().await {
                Ok(frame) => {
                    self.stats.record_frame();
                    tracing::debug!(start = frame.header.start, "frame received");
                    scheduler.submit(frame).await;
                }
                Err(ProtocolError::ConnectionClosed) | Err(ProtocolError::EndOfStream) => {
                    return Ok(())
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn build_pipeline(&self) -> Result<Pipeline> {
        let geometry = Arc::new(AntennaGeometry::load(
            &self.config.antenna_table,
            NUM_ANTS,
        )?);
        let index = Arc::new(IndexMap::new(
            self.config.polarization,
            NUM_CHAN,
            NUM_BSLN,
            NUM_POLS,
        ));
        let processor = FrameProcessor::new(
            geometry,
            index,
            self.config.image_size,
            self.config.frequency_hz,
        );

        let mut scheduler = Scheduler::new(
            processor,
            self.config.max_in_flight,
            Arc::clone(&self.stats),
        );
        let mut sinks = Vec::new();

        let writer = DiskWriter::new(
            &self.config.media_root,
            self.config.frequency_hz,
            NUM_CHAN,
        );
        sinks.push(spawn_disk_sink(
            scheduler.subscribe(),
            writer,
            Arc::clone(&self.stats),
        ));

        if let Some(destination) = &self.config.stream_destination {
            sinks.push(spawn_stream_sink(
                scheduler.subscribe(),
                destination.clone(),
                self.config.image_size,
                self.config.encoder_fps,
                Arc::clone(&self.stats),
            ));
        }

        scheduler.start();
        Ok(Pipeline { scheduler, sinks })
    }
}

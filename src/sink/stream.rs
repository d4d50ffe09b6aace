//! Video-streaming sink
//!
//! Owns one external encoder process (`ffmpeg`) fed raw 8-bit grayscale
//! frames over stdin. Each received image is written [`fps`] times (one
//! second of video per integration) and the sink then sleeps to the next
//! one-second boundary so output cadence stays real-time regardless of
//! compute jitter.
//!
//! The child is a scoped resource: `kill_on_drop` guarantees termination
//! on every exit path, and [`StreamEncoder::shutdown`] kills and reaps it
//! explicitly. A dead encoder surfaces as [`EncoderError::Exited`]; the
//! sink task responds by respawning the encoder for the next product.
//!
//! [`fps`]: crate::constants::FPS

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::EncoderError;
use crate::imaging::imager::SkyImage;
use crate::pipeline::product::FrameProduct;
use crate::stats::PipelineStats;

/// Output duty cycle in seconds: one image fills one second of video.
const DUTY_CYCLE_S: f64 = 1.0;

/// Handle to the external encoder process.
pub struct StreamEncoder {
    child: Child,
    stdin: ChildStdin,
    epoch: Instant,
    fps: u32,
}

impl StreamEncoder {
    /// Spawn the encoder with the fixed parameter set: raw grayscale video
    /// on stdin at the image resolution, x264 at a fixed preset, flv
    /// container, `destination` as the final argument.
    pub fn spawn(destination: &str, resolution: usize, fps: u32) -> Result<Self, EncoderError> {
        let mut child = Command::new("ffmpeg")
            .args(["-re", "-f", "rawvideo"])
            .arg("-s")
            .arg(format!("{resolution}x{resolution}"))
            .args(["-pix_fmt", "gray", "-i", "-"])
            .arg("-r")
            .arg(fps.to_string())
            .args(["-vcodec", "libx264", "-preset", "ultrafast", "-g", "20"])
            .args(["-threads", "6", "-bufsize", "512k", "-f", "flv"])
            .arg(destination)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(EncoderError::Spawn)?;

        let stdin = child.stdin.take().ok_or(EncoderError::Stdin)?;
        tracing::info!(destination, resolution, fps, "encoder started");

        Ok(Self {
            child,
            stdin,
            epoch: Instant::now(),
            fps,
        })
    }

    /// Write one second of video for `image`, then pace to the next
    /// duty-cycle boundary.
    pub async fn send(&mut self, image: &SkyImage) -> Result<(), EncoderError> {
        self.check_alive()?;

        let gray = to_grayscale(image);
        for _ in 0..self.fps {
            self.stdin
                .write_all(&gray)
                .await
                .map_err(EncoderError::Write)?;
        }

        let elapsed = self.epoch.elapsed().as_secs_f64();
        let wait = DUTY_CYCLE_S - (elapsed % DUTY_CYCLE_S);
        tokio::time::sleep(Duration::from_secs_f64(wait)).await;
        Ok(())
    }

    /// Non-blocking liveness check.
    fn check_alive(&mut self) -> Result<(), EncoderError> {
        match self.child.try_wait() {
            Ok(None) => Ok(()),
            Ok(Some(status)) => Err(EncoderError::Exited(status)),
            Err(e) => Err(EncoderError::Wait(e)),
        }
    }

    /// Kill and reap the child.
    pub async fn shutdown(mut self) {
        let _ = self.stdin.shutdown().await;
        if let Err(e) = self.child.kill().await {
            tracing::debug!(error = %e, "encoder already gone at shutdown");
        }
    }
}

/// Normalize an image to 8-bit grayscale: subtract the minimum, scale by
/// `255 / max`. A flat image maps to all zeros instead of dividing by
/// zero.
pub fn to_grayscale(image: &SkyImage) -> Vec<u8> {
    let data = image.data();
    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max) - min;

    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    data.iter().map(|&v| ((v - min) * scale) as u8).collect()
}

/// Run the streaming sink until its queue closes.
///
/// The encoder is spawned up front and respawned on the product after it
/// dies; a product that cannot be encoded is dropped, never retried.
pub fn spawn_stream_sink(
    mut rx: UnboundedReceiver<FrameProduct>,
    destination: String,
    resolution: usize,
    fps: u32,
    stats: Arc<PipelineStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut encoder = StreamEncoder::spawn(&destination, resolution, fps)
            .map_err(|e| tracing::warn!(error = %e, "encoder unavailable at startup"))
            .ok();

        while let Some(product) = rx.recv().await {
            if encoder.is_none() {
                encoder = StreamEncoder::spawn(&destination, resolution, fps)
                    .map_err(|e| tracing::warn!(error = %e, "encoder respawn failed"))
                    .ok();
            }
            let Some(active) = encoder.as_mut() else {
                continue;
            };

            match active.send(&product.image).await {
                Ok(()) => stats.record_stream_send(),
                Err(e) => {
                    tracing::warn!(error = %e, "stream send failed; respawning next product");
                    encoder = None;
                }
            }
        }

        if let Some(active) = encoder {
            active.shutdown().await;
        }
        tracing::debug!("stream sink drained");
    })
}

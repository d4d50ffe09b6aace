//! Disk-archiving sink
//!
//! Consumes frame products on a dedicated blocking thread and writes five
//! artifacts per product: the sky image, the lag trend, the channel-power
//! waterfall, the correlation-magnitude map, and the difference against
//! the previous image. Filenames carry the frequency band and the frame
//! timestamp; a `{figure}.png` symlink per artifact kind always points at
//! the most recent file.
//!
//! All rolling history lives in the writer itself and is threaded
//! through [`DiskWriter::handle`]; there is no ambient state.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::constants::{HISTORY_LEN, SUBBAND_WIDTH_HZ};
use crate::error::Result;
use crate::imaging::imager::SkyImage;
use crate::pipeline::product::FrameProduct;
use crate::sink::render;
use crate::stats::PipelineStats;

const FILENAME_RANGE: &str = "R01-63";
const TIMESTAMP_FORMAT: &str = "T%d-%m-%Y-%H-%M-%S";

/// Stateful disk sink.
pub struct DiskWriter {
    root: PathBuf,
    band: u32,
    channels: usize,
    /// Rolling `now - frame_timestamp` history in seconds.
    lag: VecDeque<f32>,
    /// `[channel][HISTORY_LEN]` waterfall, newest column first.
    waterfall: Vec<f32>,
    prev_image: Option<Arc<SkyImage>>,
    /// Frame time of the products the `latest` links currently point at;
    /// links never move backwards when products arrive out of order.
    newest_linked: Option<DateTime<Utc>>,
}

impl DiskWriter {
    pub fn new(root: impl Into<PathBuf>, frequency_hz: f64, channels: usize) -> Self {
        Self {
            root: root.into(),
            band: (frequency_hz / SUBBAND_WIDTH_HZ).floor() as u32,
            channels,
            lag: VecDeque::with_capacity(HISTORY_LEN),
            waterfall: vec![0.0; channels * HISTORY_LEN],
            prev_image: None,
            newest_linked: None,
        }
    }

    /// Update the histories and write the five artifacts for one product.
    pub fn handle(&mut self, product: &FrameProduct) -> Result<()> {
        let lag_s = (Utc::now() - product.timestamp).num_milliseconds() as f32 / 1000.0;
        self.lag.push_back(lag_s);
        if self.lag.len() > HISTORY_LEN {
            self.lag.pop_front();
        }

        for row in 0..self.channels {
            let base = row * HISTORY_LEN;
            for col in (1..HISTORY_LEN).rev() {
                self.waterfall[base + col] = self.waterfall[base + col - 1];
            }
            self.waterfall[base] = product.channels.get(row).copied().unwrap_or(0.0);
        }

        let prev = self
            .prev_image
            .as_deref()
            .unwrap_or_else(|| product.image.as_ref());
        let diff = difference(&product.image, prev);
        self.prev_image = Some(Arc::clone(&product.image));

        let stamp = product.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let size = product.image.size();
        let n_ants = product.correlation.n_ants();
        let lag_values: Vec<f32> = self.lag.iter().copied().collect();

        let mut written: Vec<(&'static str, String)> = Vec::with_capacity(5);

        let name = self.filename(&stamp, "image");
        render::heatmap(&self.root.join(&name), product.image.data(), size, size)?;
        written.push(("image", name));

        let name = self.filename(&stamp, "lag");
        render::series(&self.root.join(&name), &lag_values)?;
        written.push(("lag", name));

        let name = self.filename(&stamp, "chan");
        render::heatmap(
            &self.root.join(&name),
            &self.waterfall,
            self.channels,
            HISTORY_LEN,
        )?;
        written.push(("chan", name));

        let name = self.filename(&stamp, "corr");
        render::heatmap(
            &self.root.join(&name),
            product.correlation.data(),
            n_ants,
            n_ants,
        )?;
        written.push(("corr", name));

        let name = self.filename(&stamp, "diff");
        render::heatmap(&self.root.join(&name), &diff, size, size)?;
        written.push(("diff", name));

        if self
            .newest_linked
            .map_or(true, |linked| product.timestamp >= linked)
        {
            for (figure, file) in &written {
                self.relink(figure, file)?;
            }
            self.newest_linked = Some(product.timestamp);
        } else {
            tracing::debug!(
                timestamp = %product.timestamp,
                "stale product archived; latest links unchanged"
            );
        }

        tracing::info!(timestamp = %stamp, "wrote artifact set");
        Ok(())
    }

    fn filename(&self, stamp: &str, figure: &str) -> String {
        format!(
            "S{}_{}_{}_{}.png",
            self.band, FILENAME_RANGE, stamp, figure
        )
    }

    /// Atomically retarget `{figure}.png`: symlink to a temporary name,
    /// then rename over the link.
    fn relink(&self, figure: &str, target: &str) -> io::Result<()> {
        let tmp = self.root.join(format!(".{figure}.png.tmp"));
        let _ = fs::remove_file(&tmp);
        std::os::unix::fs::symlink(target, &tmp)?;
        fs::rename(&tmp, self.root.join(format!("{figure}.png")))?;
        Ok(())
    }
}

/// Pixel-wise `current - previous`.
fn difference(current: &SkyImage, previous: &SkyImage) -> Vec<f32> {
    current
        .data()
        .iter()
        .zip(previous.data().iter())
        .map(|(a, b)| a - b)
        .collect()
}

/// Run a writer on a dedicated blocking thread until its queue closes.
///
/// A write failure is fatal to the sink: it logs and stops consuming.
pub fn spawn_disk_sink(
    mut rx: UnboundedReceiver<FrameProduct>,
    mut writer: DiskWriter,
    stats: Arc<PipelineStats>,
) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        while let Some(product) = rx.blocking_recv() {
            match writer.handle(&product) {
                Ok(()) => stats.record_disk_write(),
                Err(e) => {
                    tracing::error!(error = %e, "disk sink failed");
                    break;
                }
            }
        }
        tracing::debug!("disk sink drained");
    })
}

#[cfg(test)]
mod tests {
    use num_complex::Complex32;

    use super::*;
    use crate::imaging::correlation::correlation_matrix;
    use crate::protocol::VisibilityMatrix;

    fn product(start: f64, level: f32) -> FrameProduct {
        let size = 8;
        let image: Vec<f32> = (0..size * size).map(|i| level * i as f32).collect();
        let corr = correlation_matrix(
            &VisibilityMatrix::new(1, 3, vec![Complex32::new(level, 0.0); 3]),
            2,
        );
        FrameProduct {
            timestamp: DateTime::from_timestamp(start as i64, 0).unwrap(),
            unix_seconds: start,
            image: Arc::new(SkyImage::new(size, image)),
            correlation: Arc::new(corr.magnitude_map()),
            channels: Arc::new(vec![level, level * 2.0]),
        }
    }

    #[test]
    fn difference_is_zero_only_for_identical_images() {
        let a = SkyImage::new(2, vec![1.0, 2.0, 3.0, 4.0]);
        let b = SkyImage::new(2, vec![1.0, 1.0, 3.0, 5.0]);
        assert!(difference(&a, &a).iter().all(|&v| v == 0.0));
        assert_eq!(difference(&a, &b), vec![0.0, 1.0, 0.0, -1.0]);
    }

    #[test]
    fn two_cycles_write_ten_artifacts_and_retarget_links() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DiskWriter::new(dir.path(), 58_398_437.5, 2);

        writer.handle(&product(1_600_000_000.0, 1.0)).unwrap();
        writer.handle(&product(1_600_000_001.0, 2.0)).unwrap();

        let pngs: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with('S'))
            .collect();
        assert_eq!(pngs.len(), 10);
        // Band 299 for the default frequency.
        assert!(pngs.iter().all(|name| name.starts_with("S299_R01-63_T")));

        for figure in ["image", "lag", "chan", "corr", "diff"] {
            let link = dir.path().join(format!("{figure}.png"));
            let target = fs::read_link(&link).unwrap();
            let target = target.to_string_lossy();
            assert!(target.contains(&format!("_{figure}.png")));
            // Points at the second cycle's file.
            assert!(pngs.contains(&target.to_string()));
            let second_stamp = DateTime::from_timestamp(1_600_000_001, 0)
                .unwrap()
                .format(TIMESTAMP_FORMAT)
                .to_string();
            assert!(target.contains(&second_stamp));
        }
    }

    #[test]
    fn first_cycle_diffs_against_itself() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DiskWriter::new(dir.path(), 58_398_437.5, 2);

        let first = product(1_600_000_000.0, 1.0);
        writer.handle(&first).unwrap();

        // The stored previous image is the first image itself.
        let prev = writer.prev_image.as_ref().unwrap();
        assert!(difference(&first.image, prev).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn stale_product_does_not_move_links_backwards() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DiskWriter::new(dir.path(), 58_398_437.5, 2);

        writer.handle(&product(1_600_000_010.0, 1.0)).unwrap();
        writer.handle(&product(1_600_000_000.0, 2.0)).unwrap();

        let newest_stamp = DateTime::from_timestamp(1_600_000_010, 0)
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let target = fs::read_link(dir.path().join("image.png")).unwrap();
        assert!(target.to_string_lossy().contains(&newest_stamp));

        // The stale product was still archived.
        let pngs = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .starts_with('S')
            })
            .count();
        assert_eq!(pngs, 10);
    }

    #[test]
    fn waterfall_shifts_newest_into_column_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = DiskWriter::new(dir.path(), 58_398_437.5, 2);

        writer.handle(&product(1_600_000_000.0, 1.0)).unwrap();
        writer.handle(&product(1_600_000_001.0, 3.0)).unwrap();

        // Row 0: newest first.
        assert_eq!(writer.waterfall[0], 3.0);
        assert_eq!(writer.waterfall[1], 1.0);
        // Row 1 carries the doubled channel value.
        assert_eq!(writer.waterfall[HISTORY_LEN], 6.0);
        assert_eq!(writer.waterfall[HISTORY_LEN + 1], 2.0);
        assert_eq!(writer.lag.len(), 2);
    }
}

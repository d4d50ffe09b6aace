//! Per-frame compute worker body

use std::sync::Arc;

use num_complex::Complex32;

use crate::constants::C_MS;
use crate::imaging::correlation::{apply_gains, channel_power, correlation_matrix};
use crate::imaging::geometry::AntennaGeometry;
use crate::imaging::gridder::grid;
use crate::imaging::imager::Imager;
use crate::pipeline::product::FrameProduct;
use crate::protocol::frame::Frame;
use crate::protocol::index::IndexMap;

/// Turns one frame into a [`FrameProduct`].
///
/// Holds the shared read-only tables (geometry, index permutation, FFT
/// plan); one instance is shared by every compute worker.
pub struct FrameProcessor {
    geometry: Arc<AntennaGeometry>,
    index: Arc<IndexMap>,
    imager: Imager,
    /// UV cell size in meters: half the observing wavelength.
    cell_scale: f64,
    /// Optional per-antenna calibration vector; `None` means unit gains.
    gains: Option<Vec<Complex32>>,
}

impl FrameProcessor {
    pub fn new(
        geometry: Arc<AntennaGeometry>,
        index: Arc<IndexMap>,
        image_size: usize,
        frequency_hz: f64,
    ) -> Self {
        Self {
            geometry,
            index,
            imager: Imager::new(image_size),
            cell_scale: C_MS / frequency_hz / 2.0,
            gains: None,
        }
    }

    /// Attach a calibration vector, one complex gain per antenna.
    pub fn with_gains(mut self, gains: Vec<Complex32>) -> Self {
        self.gains = Some(gains);
        self
    }

    pub fn image_size(&self) -> usize {
        self.imager.size()
    }

    /// The full per-frame calculation: gather, channel power, Hermitian
    /// correlation matrix, magnitude map, grid, FFT image.
    pub fn process(&self, frame: &Frame) -> FrameProduct {
        let vis = self.index.gather(&frame.samples);
        let channels = channel_power(&vis);

        let mut corr = correlation_matrix(&vis, self.geometry.n_ants());
        if let Some(gains) = &self.gains {
            apply_gains(&mut corr, gains);
        }
        let magnitude = corr.magnitude_map();

        let uv = grid(&self.geometry, &corr, self.cell_scale, self.imager.size());
        let image = self.imager.image(&uv);

        FrameProduct {
            timestamp: frame.start_utc(),
            unix_seconds: frame.header.start,
            image: Arc::new(image),
            correlation: Arc::new(magnitude),
            channels: Arc::new(channels),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::protocol::frame::FrameHeader;

    /// A toy layout: 3 antennas, 6 baselines, 2 channels, 2 polarizations.
    pub(crate) fn toy_processor() -> FrameProcessor {
        let geometry = Arc::new(AntennaGeometry::from_locals(&[
            [0.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
            [1.0, 3.0, 0.0],
        ]));
        let index = Arc::new(IndexMap::new(0, 2, 6, 2));
        // cell_scale of 1.0 m
        FrameProcessor::new(geometry, index, 16, C_MS / 2.0)
    }

    pub(crate) fn toy_frame(start: f64, fill: Complex32) -> Frame {
        Frame {
            header: FrameHeader {
                start,
                end: start + 1.0,
            },
            samples: vec![fill; 6 * 2 * 2],
        }
    }

    #[test]
    fn all_zero_frame_yields_all_zero_product() {
        let processor = toy_processor();
        let product = processor.process(&toy_frame(1000.0, Complex32::new(0.0, 0.0)));

        assert_eq!(product.unix_seconds, 1000.0);
        assert_eq!(product.image.size(), 16);
        assert!(product.image.data().iter().all(|&v| v == 0.0));
        assert!(product.channels.iter().all(|&p| p == 0.0));
        assert!(product.channels.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn active_frame_yields_finite_products() {
        let processor = toy_processor();
        let product = processor.process(&toy_frame(1000.0, Complex32::new(1.0, 0.5)));

        assert!(product.image.data().iter().any(|&v| v != 0.0));
        assert!(product.image.data().iter().all(|v| v.is_finite()));
        assert_eq!(product.correlation.n_ants(), 3);
        assert_eq!(product.channels.len(), 2);
    }

    #[test]
    fn gains_change_the_imaged_power() {
        let processor = toy_processor();
        let reference = processor.process(&toy_frame(0.0, Complex32::new(1.0, 0.0)));

        let scaled = toy_processor().with_gains(vec![Complex32::new(2.0, 0.0); 3]);
        let product = scaled.process(&toy_frame(0.0, Complex32::new(1.0, 0.0)));

        // Uniform gain g scales every correlation by |g|², and the FFT is
        // linear.
        let total: f32 = product.image.data().iter().map(|v| v.abs()).sum();
        let reference_total: f32 = reference.image.data().iter().map(|v| v.abs()).sum();
        assert!((total - 4.0 * reference_total).abs() < reference_total * 1e-3);
    }
}

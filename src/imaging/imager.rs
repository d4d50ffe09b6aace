//! Fourier inversion of the UV grid
//!
//! The gridded visibilities become a sky image via:
//! fftshift → flip both axes → conjugate → 2D forward FFT → fftshift →
//! real part. The ordering is a correctness requirement: reordering any
//! step changes the parity/orientation of the output image.

use std::sync::Arc;

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::imaging::gridder::UvGrid;

/// Real-valued sky image, one per frame.
#[derive(Debug, Clone)]
pub struct SkyImage {
    size: usize,
    data: Vec<f32>,
}

impl SkyImage {
    pub fn new(size: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), size * size);
        Self { size, data }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.size + col]
    }
}

/// Plans the FFT once and transforms UV grids into sky images.
///
/// The plan is an `Arc` internally, so `Imager` is cheap to clone and safe
/// to share across compute workers.
#[derive(Clone)]
pub struct Imager {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
}

impl Imager {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { size, fft }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform one UV grid into a real-valued sky image.
    pub fn image(&self, grid: &UvGrid) -> SkyImage {
        debug_assert_eq!(grid.size(), self.size);
        let size = self.size;
        let mut buffer = grid.data().to_vec();

        fftshift(&mut buffer, size);
        // Flip both axes: reversing the row-major buffer reverses rows and
        // columns at once.
        buffer.reverse();
        for value in buffer.iter_mut() {
            *value = value.conj();
        }

        // 2D transform: rows, transpose, rows again, transpose back.
        for row in buffer.chunks_mut(size) {
            self.fft.process(row);
        }
        let mut transposed = transpose(&buffer, size);
        for row in transposed.chunks_mut(size) {
            self.fft.process(row);
        }
        let mut output = transpose(&transposed, size);

        fftshift(&mut output, size);
        SkyImage {
            size,
            data: output.iter().map(|c| c.re).collect(),
        }
    }
}

/// Move the zero-frequency component to the array center.
fn fftshift(data: &mut [Complex32], size: usize) {
    let half = size / 2;
    let mut shifted = vec![Complex32::new(0.0, 0.0); data.len()];
    for r in 0..size {
        for c in 0..size {
            let sr = (r + half) % size;
            let sc = (c + half) % size;
            shifted[sr * size + sc] = data[r * size + c];
        }
    }
    data.copy_from_slice(&shifted);
}

fn transpose(data: &[Complex32], size: usize) -> Vec<Complex32> {
    let mut out = vec![Complex32::new(0.0, 0.0); data.len()];
    for r in 0..size {
        for c in 0..size {
            out[c * size + r] = data[r * size + c];
        }
    }
    out
}

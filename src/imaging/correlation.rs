//! Correlation matrix reconstruction
//!
//! The correlator stores only the lower triangle of antenna pairs
//! (including self-correlations), enumerated row-major: `(0,0)`, `(1,0)`,
//! `(1,1)`, `(2,0)`, ... Reducing the visibility matrix over channels gives
//! one complex value per baseline; placing those back into a full
//! antenna×antenna matrix with conjugates in the upper triangle makes the
//! result Hermitian by construction.

use num_complex::Complex32;

use crate::protocol::VisibilityMatrix;

/// Full antenna×antenna Hermitian correlation matrix.
///
/// The lower triangle (including the diagonal) holds the as-measured
/// values; the upper triangle is their conjugates.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    n: usize,
    data: Vec<Complex32>,
}

impl CorrelationMatrix {
    pub fn n_ants(&self) -> usize {
        self.n
    }

    pub fn at(&self, a1: usize, a2: usize) -> Complex32 {
        self.data[a1 * self.n + a2]
    }

    /// Display-oriented magnitude map: `|M|` with the self-correlation
    /// diagonal replaced by the matrix-wide minimum so autocorrelation
    /// power does not dominate the color scale. Not part of the imaging
    /// path.
    pub fn magnitude_map(&self) -> MagnitudeMatrix {
        let mut data: Vec<f32> = self.data.iter().map(|c| c.norm()).collect();
        let min = data.iter().copied().fold(f32::INFINITY, f32::min);
        for a in 0..self.n {
            data[a * self.n + a] = min;
        }
        MagnitudeMatrix { n: self.n, data }
    }
}

/// Real-valued antenna×antenna matrix, used for the correlation display.
#[derive(Debug, Clone)]
pub struct MagnitudeMatrix {
    n: usize,
    data: Vec<f32>,
}

impl MagnitudeMatrix {
    pub fn n_ants(&self) -> usize {
        self.n
    }

    pub fn at(&self, a1: usize, a2: usize) -> f32 {
        self.data[a1 * self.n + a2]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Reduce over channels and rebuild the full Hermitian matrix from the
/// stored lower triangle.
///
/// `n_ants` must satisfy `baselines == n_ants * (n_ants + 1) / 2`.
pub fn correlation_matrix(vis: &VisibilityMatrix, n_ants: usize) -> CorrelationMatrix {
    let baselines = vis.baselines();
    let channels = vis.channels();
    debug_assert_eq!(baselines, n_ants * (n_ants + 1) / 2);

    let mut triangle = vec![Complex32::new(0.0, 0.0); baselines];
    for (b, value) in triangle.iter_mut().enumerate() {
        let mut sum = Complex32::new(0.0, 0.0);
        for c in 0..channels {
            sum += vis.at(c, b);
        }
        *value = sum / channels as f32;
    }

    let mut data = vec![Complex32::new(0.0, 0.0); n_ants * n_ants];
    let mut k = 0;
    for i in 0..n_ants {
        for j in 0..=i {
            let measured = triangle[k];
            k += 1;
            // Upper triangle first: the diagonal ends up holding the
            // as-measured value, matching the lower triangle.
            data[j * n_ants + i] = measured.conj();
            data[i * n_ants + j] = measured;
        }
    }

    CorrelationMatrix { n: n_ants, data }
}

/// Apply a per-antenna calibration vector: `M[i][j] *= conj(g[i]) * g[j]`.
/// A vector of unit gains is the identity.
pub fn apply_gains(matrix: &mut CorrelationMatrix, gains: &[Complex32]) {
    debug_assert_eq!(gains.len(), matrix.n);
    let n = matrix.n;
    for i in 0..n {
        for j in 0..n {
            matrix.data[i * n + j] *= gains[i].conj() * gains[j];
        }
    }
}

/// Mean normalized magnitude per channel, in dB when the aggregate power
/// is strictly positive. An all-zero observation stays all-zero instead of
/// producing `-inf`.
pub fn channel_power(vis: &VisibilityMatrix) -> Vec<f32> {
    let baselines = vis.baselines();
    let mut power: Vec<f32> = (0..vis.channels())
        .map(|c| {
            let mut sum = Complex32::new(0.0, 0.0);
            for b in 0..baselines {
                sum += vis.at(c, b);
            }
            (sum / baselines as f32).norm()
        })
        .collect();

    if power.iter().sum::<f32>() > 0.0 {
        for p in power.iter_mut() {
            *p = 10.0 * p.log10();
        }
    }
    power
}

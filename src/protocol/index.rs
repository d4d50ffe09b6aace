//! Sample-stream permutation
//!
//! The GPU correlator interleaves the sample stream as
//! `(baseline, channel, polarization)`. [`IndexMap`] precomputes, for one
//! polarization, the gather permutation that reshapes the flat stream into
//! a `[channel][baseline]` matrix. It is a pure function of its four
//! integers; build it once at startup and share it across workers.

use num_complex::Complex32;

/// Precomputed gather permutation for one polarization.
#[derive(Debug, Clone)]
pub struct IndexMap {
    channels: usize,
    baselines: usize,
    /// Flat source index for each `[channel][baseline]` cell, row-major.
    indices: Vec<u32>,
}

impl IndexMap {
    /// Build the permutation for `polarization` out of `pols` interleaved
    /// polarizations.
    ///
    /// The flat source index of channel `c`, baseline `b` is
    /// `polarization + c*pols + b*pols*channels`. For valid inputs
    /// (`polarization < pols`) the result is a bijection onto
    /// `[0, channels*baselines)` offset by the polarization stride.
    pub fn new(polarization: usize, channels: usize, baselines: usize, pols: usize) -> Self {
        let mut indices = vec![0u32; channels * baselines];
        for b in 0..baselines {
            for c in 0..channels {
                indices[c * baselines + b] = (polarization + c * pols + b * pols * channels) as u32;
            }
        }
        Self {
            channels,
            baselines,
            indices,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn baselines(&self) -> usize {
        self.baselines
    }

    /// Gather the raw sample stream into a `[channel][baseline]` matrix.
    pub fn gather(&self, samples: &[Complex32]) -> VisibilityMatrix {
        debug_assert!(
            samples.len() >= self.indices.iter().map(|&i| i as usize + 1).max().unwrap_or(0),
            "sample stream shorter than the permutation range"
        );
        let data = self
            .indices
            .iter()
            .map(|&i| samples[i as usize])
            .collect();
        VisibilityMatrix {
            channels: self.channels,
            baselines: self.baselines,
            data,
        }
    }

    #[cfg(test)]
    fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// One polarization's visibilities as a `[channel][baseline]` matrix.
#[derive(Debug, Clone)]
pub struct VisibilityMatrix {
    channels: usize,
    baselines: usize,
    data: Vec<Complex32>,
}

impl VisibilityMatrix {
    pub fn new(channels: usize, baselines: usize, data: Vec<Complex32>) -> Self {
        assert_eq!(data.len(), channels * baselines);
        Self {
            channels,
            baselines,
            data,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn baselines(&self) -> usize {
        self.baselines
    }

    pub fn at(&self, channel: usize, baseline: usize) -> Complex32 {
        self.data[channel * self.baselines + baseline]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn formula_matches_correlator_layout() {
        let map = IndexMap::new(1, 3, 4, 2);
        // channel 2, baseline 3: 1 + 2*2 + 3*2*3
        assert_eq!(map.indices()[2 * 4 + 3], 1 + 4 + 18);
    }

    #[test]
    fn permutation_is_a_bijection() {
        for (pol, channels, baselines, pols) in
            [(0, 4, 6, 1), (0, 3, 10, 2), (1, 3, 10, 2), (2, 5, 7, 3)]
        {
            let map = IndexMap::new(pol, channels, baselines, pols);
            let distinct: HashSet<u32> = map.indices().iter().copied().collect();
            assert_eq!(distinct.len(), channels * baselines);
            // Strip the polarization stride: the residuals cover
            // [0, channels*baselines) exactly once.
            let covered: HashSet<usize> = map
                .indices()
                .iter()
                .map(|&i| (i as usize - pol) / pols)
                .collect();
            assert_eq!(covered, (0..channels * baselines).collect());
        }
    }

    #[test]
    fn gather_reshapes_the_stream() {
        let channels = 2;
        let baselines = 3;
        let pols = 2;
        let samples: Vec<Complex32> = (0..channels * baselines * pols)
            .map(|i| Complex32::new(i as f32, 0.0))
            .collect();

        let map = IndexMap::new(0, channels, baselines, pols);
        let matrix = map.gather(&samples);

        for b in 0..baselines {
            for c in 0..channels {
                let expected = (c * pols + b * pols * channels) as f32;
                assert_eq!(matrix.at(c, b).re, expected);
            }
        }
    }
}

//! UV-plane gridding
//!
//! Splats every antenna pair's correlation value onto the complex UV grid
//! with a 4-point bilinear kernel. Self-pairs carry half weight so
//! self-correlation energy is not double counted against the Hermitian
//! convention. This loop is O(n_ants²) per frame and dominates per-frame
//! cost.

use num_complex::Complex32;

use crate::imaging::correlation::CorrelationMatrix;
use crate::imaging::geometry::AntennaGeometry;

/// Zero-initialized complex UV grid, filled once per frame and consumed by
/// the imager.
#[derive(Debug, Clone)]
pub struct UvGrid {
    size: usize,
    data: Vec<Complex32>,
}

impl UvGrid {
    /// Wrap an existing row-major buffer as a grid.
    pub fn from_data(size: usize, data: Vec<Complex32>) -> Self {
        assert_eq!(data.len(), size * size);
        Self { size, data }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[Complex32] {
        &self.data
    }

    pub fn at(&self, row: usize, col: usize) -> Complex32 {
        self.data[row * self.size + col]
    }
}

/// Grid all pairwise correlations.
///
/// `cell_scale` is the UV cell size in meters (half the observing
/// wavelength). Pixel coordinates are `U/cell_scale + size/2 - 1`; the four
/// floor/ceil corners receive `weight_axis = pair_weight - fractional
/// distance` products. On exactly integral coordinates the corners
/// coincide and their contributions add. Corners that fall outside the
/// grid are skipped.
pub fn grid(
    geometry: &AntennaGeometry,
    corr: &CorrelationMatrix,
    cell_scale: f64,
    size: usize,
) -> UvGrid {
    let n_ants = geometry.n_ants();
    let mut data = vec![Complex32::new(0.0, 0.0); size * size];
    let center = size as f64 / 2.0 - 1.0;

    for a1 in 0..n_ants {
        for a2 in 0..n_ants {
            let pair_weight = if a1 == a2 { 0.5 } else { 1.0 };
            let (bu, bv) = geometry.baseline(a1, a2);
            let u = bu / cell_scale + center;
            let v = bv / cell_scale + center;

            let west = u.floor();
            let east = u.ceil();
            let south = v.floor();
            let north = v.ceil();

            let west_power = pair_weight - (u - west);
            let east_power = pair_weight - (east - u);
            let south_power = pair_weight - (v - south);
            let north_power = pair_weight - (north - v);

            let value = corr.at(a1, a2);
            let corners = [
                (south, west, south_power * west_power),
                (north, west, north_power * west_power),
                (south, east, south_power * east_power),
                (north, east, north_power * east_power),
            ];
            for (row, col, weight) in corners {
                if row < 0.0 || col < 0.0 || row >= size as f64 || col >= size as f64 {
                    continue;
                }
                data[row as usize * size + col as usize] += value * weight as f32;
            }
        }
    }

    UvGrid { size, data }
}

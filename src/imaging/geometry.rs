//! Antenna geometry
//!
//! Loads the antenna position table (one whitespace-separated XYZ row per
//! antenna), rotates the positions into the local east-north-up-derived
//! basis, and precomputes the pairwise baseline (U, V) projections used by
//! the gridder. Immutable after load; build once and share behind an `Arc`.

use std::fs;
use std::path::Path;

use crate::error::GeometryError;

/// Fixed rotation from the table's geocentric frame into the local basis.
const ROTATION: [[f64; 3]; 3] = [
    [-0.119_595, -0.791_954, 0.598_753],
    [0.992_823, -0.095_419, 0.072_099],
    [0.000_033, 0.603_078, 0.797_682],
];

/// Rotated antenna positions and their pairwise baseline projections.
#[derive(Debug, Clone)]
pub struct AntennaGeometry {
    n_ants: usize,
    /// `u[a1 * n_ants + a2]` is the east-west separation of the pair.
    u: Vec<f64>,
    /// `v[a1 * n_ants + a2]` is the north-south separation of the pair.
    v: Vec<f64>,
}

impl AntennaGeometry {
    /// Load a position table and precompute all pairwise projections.
    ///
    /// Blank lines and `#` comments are skipped; every remaining line must
    /// carry exactly three coordinates. The row count must match `n_ants`.
    pub fn load(path: impl AsRef<Path>, n_ants: usize) -> Result<Self, GeometryError> {
        let text = fs::read_to_string(path)?;
        let mut locals: Vec<[f64; 3]> = Vec::with_capacity(n_ants);

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<f64> = line
                .split_whitespace()
                .map(str::parse)
                .collect::<Result<_, _>>()
                .map_err(|_| GeometryError::Parse { line: lineno + 1 })?;
            if fields.len() != 3 {
                return Err(GeometryError::Parse { line: lineno + 1 });
            }

            let mut local = [0.0f64; 3];
            for (k, value) in local.iter_mut().enumerate() {
                *value = (0..3).map(|j| fields[j] * ROTATION[j][k]).sum();
            }
            locals.push(local);
        }

        if locals.len() != n_ants {
            return Err(GeometryError::WrongRowCount {
                expected: n_ants,
                actual: locals.len(),
            });
        }

        let mut u = vec![0.0f64; n_ants * n_ants];
        let mut v = vec![0.0f64; n_ants * n_ants];
        for a1 in 0..n_ants {
            for a2 in 0..n_ants {
                u[a1 * n_ants + a2] = locals[a1][0] - locals[a2][0];
                v[a1 * n_ants + a2] = locals[a1][1] - locals[a2][1];
            }
        }

        Ok(Self { n_ants, u, v })
    }

    /// Build directly from rotated local positions. Used by tests and by
    /// callers that already carry a coordinate table.
    pub fn from_locals(locals: &[[f64; 3]]) -> Self {
        let n_ants = locals.len();
        let mut u = vec![0.0f64; n_ants * n_ants];
        let mut v = vec![0.0f64; n_ants * n_ants];
        for a1 in 0..n_ants {
            for a2 in 0..n_ants {
                u[a1 * n_ants + a2] = locals[a1][0] - locals[a2][0];
                v[a1 * n_ants + a2] = locals[a1][1] - locals[a2][1];
            }
        }
        Self { n_ants, u, v }
    }

    pub fn n_ants(&self) -> usize {
        self.n_ants
    }

    /// The (U, V) projection of the pair `(a1, a2)` in meters.
    pub fn baseline(&self, a1: usize, a2: usize) -> (f64, f64) {
        (
            self.u[a1 * self.n_ants + a2],
            self.v[a1 * self.n_ants + a2],
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_table(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn baselines_are_antisymmetric() {
        let table = write_table(&[
            "# LBA outer subset",
            "10.0 0.0 0.0",
            "0.0 20.0 0.0",
            "0.0 0.0 30.0",
        ]);
        let geometry = AntennaGeometry::load(table.path(), 3).unwrap();

        for a1 in 0..3 {
            for a2 in 0..3 {
                let (u, v) = geometry.baseline(a1, a2);
                let (ru, rv) = geometry.baseline(a2, a1);
                assert_eq!(u, -ru);
                assert_eq!(v, -rv);
            }
        }
        assert_eq!(geometry.baseline(1, 1), (0.0, 0.0));
    }

    #[test]
    fn positions_are_rotated() {
        let table = write_table(&["1.0 0.0 0.0", "0.0 0.0 0.0"]);
        let geometry = AntennaGeometry::load(table.path(), 2).unwrap();

        // Antenna 0's local position is the first rotation row.
        let (u, v) = geometry.baseline(0, 1);
        assert!((u - ROTATION[0][0]).abs() < 1e-12);
        assert!((v - ROTATION[0][1]).abs() < 1e-12);
    }

    #[test]
    fn wrong_row_count_is_rejected() {
        let table = write_table(&["1 2 3", "4 5 6"]);
        let err = AntennaGeometry::load(table.path(), 3).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::WrongRowCount {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn malformed_row_is_rejected() {
        let table = write_table(&["1 2 3", "4 five 6"]);
        let err = AntennaGeometry::load(table.path(), 2).unwrap_err();
        assert!(matches!(err, GeometryError::Parse { line: 2 }));
    }
}

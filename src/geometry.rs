// src/geometry.rs
//
// Minimal lattice geometry: Bravais vectors, unit-cell atoms and cell counts.
//
// Site indexing: the basis atom runs fastest, then cells along a, b, c:
//   site = ibasis + n_cell_atoms * (ia + na * (ib + nb * ic))

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::error::{HamiltonianError, Result};
use crate::vec3::{add, norm, scale, sub, Vector3};

/// Serializable description of a geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    pub bravais_vectors: [Vector3; 3],
    /// Unit-cell atom positions (Cartesian, Å).
    pub cell_atoms: Vec<Vector3>,
    pub n_cells: [usize; 3],
}

/// A finite lattice of `nos` sites.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub bravais_vectors: [Vector3; 3],
    pub cell_atoms: Vec<Vector3>,
    pub n_cells: [usize; 3],
    /// Site positions, indexed as described above.
    pub positions: Vec<Vector3>,
    /// Rows of the inverse Bravais matrix (b*_k · a_l = δ_kl).
    reciprocal: [Vector3; 3],
}

impl Geometry {
    pub fn new(bravais_vectors: [Vector3; 3], cell_atoms: Vec<Vector3>, n_cells: [usize; 3]) -> Result<Self> {
        if cell_atoms.is_empty() {
            return Err(HamiltonianError::InvalidGeometry("no atoms in the unit cell".into()));
        }
        if n_cells.iter().any(|&n| n == 0) {
            return Err(HamiltonianError::InvalidGeometry(format!(
                "cell counts must be positive, got {:?}",
                n_cells
            )));
        }
        let all_finite = bravais_vectors
            .iter()
            .chain(cell_atoms.iter())
            .all(|v| v.iter().all(|x| x.is_finite()));
        if !all_finite {
            return Err(HamiltonianError::NonFinite("geometry"));
        }

        let [a, b, c] = bravais_vectors;
        let m = Matrix3::new(
            a[0], b[0], c[0], //
            a[1], b[1], c[1], //
            a[2], b[2], c[2],
        );
        let inv = m.try_inverse().ok_or_else(|| {
            HamiltonianError::InvalidGeometry("Bravais vectors are linearly dependent".into())
        })?;
        let reciprocal = [
            [inv[(0, 0)], inv[(0, 1)], inv[(0, 2)]],
            [inv[(1, 0)], inv[(1, 1)], inv[(1, 2)]],
            [inv[(2, 0)], inv[(2, 1)], inv[(2, 2)]],
        ];

        let mut geometry = Self {
            bravais_vectors,
            cell_atoms,
            n_cells,
            positions: Vec::new(),
            reciprocal,
        };
        geometry.positions = (0..geometry.nos())
            .map(|site| {
                let (ibasis, cell) = geometry.cell_of(site);
                let cell = [cell[0] as isize, cell[1] as isize, cell[2] as isize];
                add(geometry.cell_origin(cell), geometry.cell_atoms[ibasis])
            })
            .collect();
        Ok(geometry)
    }

    /// Simple cubic lattice with one atom per cell.
    pub fn simple_cubic(n_cells: [usize; 3], lattice_constant: f64) -> Result<Self> {
        let a = lattice_constant;
        Self::new(
            [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]],
            vec![[0.0; 3]],
            n_cells,
        )
    }

    /// Number of sites.
    #[inline]
    pub fn nos(&self) -> usize {
        self.n_cell_atoms() * self.n_cells_total()
    }

    #[inline]
    pub fn n_cell_atoms(&self) -> usize {
        self.cell_atoms.len()
    }

    #[inline]
    pub fn n_cells_total(&self) -> usize {
        self.n_cells[0] * self.n_cells[1] * self.n_cells[2]
    }

    /// Site index of basis atom `ibasis` in cell `cell`.
    #[inline]
    pub fn idx(&self, ibasis: usize, cell: [usize; 3]) -> usize {
        debug_assert!(ibasis < self.n_cell_atoms());
        debug_assert!((0..3).all(|k| cell[k] < self.n_cells[k]));
        ibasis + self.n_cell_atoms() * (cell[0] + self.n_cells[0] * (cell[1] + self.n_cells[1] * cell[2]))
    }

    /// Inverse of [`Geometry::idx`].
    #[inline]
    pub fn cell_of(&self, site: usize) -> (usize, [usize; 3]) {
        let nb = self.n_cell_atoms();
        let ibasis = site % nb;
        let mut rest = site / nb;
        let ia = rest % self.n_cells[0];
        rest /= self.n_cells[0];
        let ib = rest % self.n_cells[1];
        let ic = rest / self.n_cells[1];
        (ibasis, [ia, ib, ic])
    }

    /// Cartesian origin of a (possibly out-of-range) cell.
    pub fn cell_origin(&self, cell: [isize; 3]) -> Vector3 {
        let mut r = [0.0; 3];
        for (k, a) in self.bravais_vectors.iter().enumerate() {
            r = add(r, scale(*a, cell[k] as f64));
        }
        r
    }

    /// Cartesian shift of a whole-system periodic image.
    pub fn translation_vector(&self, translation: [i32; 3]) -> Vector3 {
        let mut r = [0.0; 3];
        for k in 0..3 {
            let periods = translation[k] as f64 * self.n_cells[k] as f64;
            r = add(r, scale(self.bravais_vectors[k], periods));
        }
        r
    }

    /// Rows of the inverse Bravais matrix.
    pub fn reciprocal(&self) -> &[Vector3; 3] {
        &self.reciprocal
    }

    /// Largest distance between two atoms of the unit cell.
    pub fn max_basis_separation(&self) -> f64 {
        let mut max = 0.0_f64;
        for a in &self.cell_atoms {
            for b in &self.cell_atoms {
                max = max.max(norm(sub(*a, *b)));
            }
        }
        max
    }

    pub fn config(&self) -> GeometryConfig {
        GeometryConfig {
            bravais_vectors: self.bravais_vectors,
            cell_atoms: self.cell_atoms.clone(),
            n_cells: self.n_cells,
        }
    }
}

impl TryFrom<&GeometryConfig> for Geometry {
    type Error = HamiltonianError;

    fn try_from(cfg: &GeometryConfig) -> Result<Self> {
        Geometry::new(cfg.bravais_vectors, cfg.cell_atoms.clone(), cfg.n_cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_indexing_is_consistent() {
        let g = Geometry::new(
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0.0; 3], [0.5, 0.5, 0.0]],
            [4, 3, 2],
        )
        .unwrap();
        assert_eq!(g.nos(), 48);
        assert_eq!(g.idx(0, [0, 0, 0]), 0);
        assert_eq!(g.idx(1, [0, 0, 0]), 1);
        assert_eq!(g.idx(0, [1, 0, 0]), 2);
        assert_eq!(g.idx(1, [3, 2, 1]), 1 + 2 * (3 + 4 * (2 + 3)));
        for site in 0..g.nos() {
            let (b, cell) = g.cell_of(site);
            assert_eq!(g.idx(b, cell), site);
        }
        assert_eq!(g.positions[g.idx(1, [2, 1, 0])], [2.5, 1.5, 0.0]);
    }

    #[test]
    fn reciprocal_rows_are_dual_to_bravais() {
        let g = Geometry::new(
            [[1.0, 0.0, 0.0], [0.5, 0.75_f64.sqrt(), 0.0], [0.0, 0.0, 2.0]],
            vec![[0.0; 3]],
            [2, 2, 1],
        )
        .unwrap();
        for k in 0..3 {
            for l in 0..3 {
                let d = crate::vec3::dot(g.reciprocal()[k], g.bravais_vectors[l]);
                let expected = if k == l { 1.0 } else { 0.0 };
                assert!((d - expected).abs() < 1e-12, "b*_{k}·a_{l} = {d}");
            }
        }
    }

    #[test]
    fn degenerate_lattice_is_rejected() {
        let err = Geometry::new(
            [[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]],
            vec![[0.0; 3]],
            [2, 2, 1],
        );
        assert!(matches!(err, Err(HamiltonianError::InvalidGeometry(_))));
        assert!(Geometry::simple_cubic([0, 1, 1], 1.0).is_err());
    }

    #[test]
    fn translation_spans_whole_system() {
        let g = Geometry::simple_cubic([3, 2, 1], 2.0).unwrap();
        assert_eq!(g.translation_vector([1, -1, 0]), [6.0, -4.0, 0.0]);
    }
}

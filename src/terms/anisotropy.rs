// src/terms/anisotropy.rs

use nalgebra::DMatrix;

use super::add_block;
use crate::vec3::{add_scaled, dot, outer, Vector3};

/// Uniaxial (second-order) anisotropy on a list of sites.
///
/// For E = −Σ K (s·n)², we get:
///   B_i = 2 K (s_i·n) n
///   H_ii = −2 K n nᵀ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnisotropyTerm {
    pub indices: Vec<usize>,
    pub magnitudes: Vec<f64>,
    pub normals: Vec<Vector3>,
}

impl AnisotropyTerm {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (usize, f64, Vector3)> + '_ {
        self.indices
            .iter()
            .zip(self.magnitudes.iter())
            .zip(self.normals.iter())
            .map(|((&i, &k), &n)| (i, k, n))
    }

    pub fn energy(&self, spins: &[Vector3]) -> f64 {
        let mut e = 0.0;
        for (i, k, n) in self.iter() {
            let sdotn = dot(spins[i], n);
            e -= k * sdotn * sdotn;
        }
        e
    }

    pub fn add_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        for (i, k, n) in self.iter() {
            let sdotn = dot(spins[i], n);
            add_scaled(&mut field[i], n, 2.0 * k * sdotn);
        }
    }

    pub fn add_hessian(&self, hessian: &mut DMatrix<f64>) {
        for (i, k, n) in self.iter() {
            add_block(hessian, i, i, &outer(n, n, -2.0 * k));
        }
    }
}

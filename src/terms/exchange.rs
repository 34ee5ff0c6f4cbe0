// src/terms/exchange.rs
//
// Isotropic Heisenberg exchange over a bond list.
//
//   E = −Σ_<ij> J_ij (s_i · s_j)
//   B_i = Σ_j J_ij s_j

use nalgebra::DMatrix;

use super::add_pair_block;
use crate::neighbours::Pair;
use crate::vec3::{add_scaled, dot, identity, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeTerm {
    pub pairs: Vec<Pair>,
    pub magnitudes: Vec<f64>,
}

impl ExchangeTerm {
    pub fn new(pairs: Vec<Pair>, magnitudes: Vec<f64>) -> Self {
        assert_eq!(pairs.len(), magnitudes.len());
        Self { pairs, magnitudes }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn energy(&self, spins: &[Vector3]) -> f64 {
        let mut e = 0.0;
        for (p, &j) in self.pairs.iter().zip(self.magnitudes.iter()) {
            e -= j * dot(spins[p.i], spins[p.j]);
        }
        e
    }

    pub fn add_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        for (p, &j) in self.pairs.iter().zip(self.magnitudes.iter()) {
            let (si, sj) = (spins[p.i], spins[p.j]);
            add_scaled(&mut field[p.i], sj, j);
            add_scaled(&mut field[p.j], si, j);
        }
    }

    pub fn add_hessian(&self, hessian: &mut DMatrix<f64>) {
        for (p, &j) in self.pairs.iter().zip(self.magnitudes.iter()) {
            add_pair_block(hessian, p.i, p.j, &identity(-j));
        }
    }
}

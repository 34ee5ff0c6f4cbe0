// src/terms/dipolar.rs
//
// Dipole–dipole interaction (DDI) over all pairs inside a cutoff radius.
//
//   E = Σ_<ij> C_ij [ (s_i · s_j) − 3 (s_i · r̂)(s_j · r̂) ]
//   C_ij = μ0 μ_B² μ_s,i μ_s,j / (4π r³)
//
// The per-pair magnitude C_ij and direction r̂ are derived from geometry and μ_s; they
// are cached here when the pair list is rebuilt.
//
//   B_i = C_ij [ 3 (s_j · r̂) r̂ − s_j ]
//   H_ij = C_ij (I − 3 r̂ r̂ᵀ)

use nalgebra::DMatrix;

use super::add_pair_block;
use crate::neighbours::Pair;
use crate::vec3::{add_scaled, dot, identity, outer, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DipolarTerm {
    pub pairs: Vec<Pair>,
    pub magnitudes: Vec<f64>,
    pub normals: Vec<Vector3>,
}

impl DipolarTerm {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&Pair, f64, Vector3)> + '_ {
        self.pairs
            .iter()
            .zip(self.magnitudes.iter())
            .zip(self.normals.iter())
            .map(|((p, &c), &n)| (p, c, n))
    }

    pub fn energy(&self, spins: &[Vector3]) -> f64 {
        let mut e = 0.0;
        for (p, c, n) in self.iter() {
            let (si, sj) = (spins[p.i], spins[p.j]);
            e += c * (dot(si, sj) - 3.0 * dot(si, n) * dot(sj, n));
        }
        e
    }

    pub fn add_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        for (p, c, n) in self.iter() {
            let (si, sj) = (spins[p.i], spins[p.j]);
            add_scaled(&mut field[p.i], n, 3.0 * c * dot(sj, n));
            add_scaled(&mut field[p.i], sj, -c);
            add_scaled(&mut field[p.j], n, 3.0 * c * dot(si, n));
            add_scaled(&mut field[p.j], si, -c);
        }
    }

    pub fn add_hessian(&self, hessian: &mut DMatrix<f64>) {
        for (p, c, n) in self.iter() {
            let nn = outer(n, n, -3.0 * c);
            let mut block = identity(c);
            for a in 0..3 {
                for b in 0..3 {
                    block[a][b] += nn[a][b];
                }
            }
            add_pair_block(hessian, p.i, p.j, &block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_to_tail_is_favoured_over_side_by_side() {
        let term = DipolarTerm {
            pairs: vec![Pair::new(0, 1, [0, 0, 0])],
            magnitudes: vec![1.0],
            normals: vec![[1.0, 0.0, 0.0]],
        };
        let head_to_tail = [[1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let side_by_side = [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        assert_eq!(term.energy(&head_to_tail), -2.0);
        assert_eq!(term.energy(&side_by_side), 1.0);
    }
}

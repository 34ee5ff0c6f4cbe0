// src/terms/dmi.rs
//
// Dzyaloshinskii–Moriya interaction over a bond list.
//
// Energy:
//   E = Σ_<ij> D_ij n_ij · (s_i × s_j)
//
// Effective field (from E = D s_i · (s_j × n) = D s_j · (n × s_i)):
//   B_i = D (n × s_j)
//   B_j = D (s_i × n)
//
// Hessian block (i, j) is the antisymmetric matrix M_ab = D ε_abc n_c.

use nalgebra::DMatrix;

use super::add_pair_block;
use crate::neighbours::Pair;
use crate::vec3::{add_scaled, cross, dot, Block3, Vector3};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiTerm {
    pub pairs: Vec<Pair>,
    pub magnitudes: Vec<f64>,
    pub normals: Vec<Vector3>,
}

impl DmiTerm {
    pub fn new(pairs: Vec<Pair>, magnitudes: Vec<f64>, normals: Vec<Vector3>) -> Self {
        assert_eq!(pairs.len(), magnitudes.len());
        assert_eq!(pairs.len(), normals.len());
        Self {
            pairs,
            magnitudes,
            normals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&Pair, f64, Vector3)> + '_ {
        self.pairs
            .iter()
            .zip(self.magnitudes.iter())
            .zip(self.normals.iter())
            .map(|((p, &d), &n)| (p, d, n))
    }

    pub fn energy(&self, spins: &[Vector3]) -> f64 {
        let mut e = 0.0;
        for (p, d, n) in self.iter() {
            e += d * dot(n, cross(spins[p.i], spins[p.j]));
        }
        e
    }

    pub fn add_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        for (p, d, n) in self.iter() {
            let (si, sj) = (spins[p.i], spins[p.j]);
            add_scaled(&mut field[p.i], cross(n, sj), d);
            add_scaled(&mut field[p.j], cross(si, n), d);
        }
    }

    pub fn add_hessian(&self, hessian: &mut DMatrix<f64>) {
        for (p, d, n) in self.iter() {
            let block: Block3 = [
                [0.0, d * n[2], -d * n[1]],
                [-d * n[2], 0.0, d * n[0]],
                [d * n[1], -d * n[0], 0.0],
            ];
            add_pair_block(hessian, p.i, p.j, &block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_handed_twist_along_normal_has_positive_energy() {
        // s_0 = x, s_1 = y: s_0 × s_1 = z.
        let term = DmiTerm::new(vec![Pair::new(0, 1, [0, 0, 0])], vec![2.0], vec![[0.0, 0.0, 1.0]]);
        let spins = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(term.energy(&spins), 2.0);

        let mut field = [[0.0; 3]; 2];
        term.add_field(&spins, &mut field);
        // B_0 = D (z × y) = −D x
        assert_eq!(field[0], [-2.0, 0.0, 0.0]);
        // B_1 = D (x × z) = −D y
        assert_eq!(field[1], [0.0, -2.0, 0.0]);
    }
}

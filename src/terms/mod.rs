// src/terms/mod.rs
//
// Individual contributions of the Heisenberg Hamiltonian.
//
// Every term offers the same three operations on a spin configuration:
//   energy(spins)            -> f64
//   add_field(spins, field)  accumulates −∂E/∂s into `field`
//   add_hessian(.., hessian) accumulates ∂²E/∂s∂s into the 3N×3N matrix
//
// Callers zero the outputs first; terms only ever add. Sums run in list order.
pub mod anisotropy;
pub mod dipolar;
pub mod dmi;
pub mod exchange;
pub mod zeeman;

pub use anisotropy::AnisotropyTerm;
pub use dipolar::DipolarTerm;
pub use dmi::DmiTerm;
pub use exchange::ExchangeTerm;
pub use zeeman::ZeemanTerm;

use nalgebra::DMatrix;

use crate::vec3::{transpose, Block3};

/// Add `block` to the (i, j) 3×3 block of `hessian`.
#[inline]
pub fn add_block(hessian: &mut DMatrix<f64>, i: usize, j: usize, block: &Block3) {
    for (a, row) in block.iter().enumerate() {
        for (b, v) in row.iter().enumerate() {
            hessian[(3 * i + a, 3 * j + b)] += *v;
        }
    }
}

/// Add a bilinear coupling s_iᵀ B s_j: block B at (i, j) and Bᵀ at (j, i).
#[inline]
pub fn add_pair_block(hessian: &mut DMatrix<f64>, i: usize, j: usize, block: &Block3) {
    add_block(hessian, i, j, block);
    add_block(hessian, j, i, &transpose(*block));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_block_on_same_site_doubles_symmetric_part() {
        let mut h = DMatrix::zeros(3, 3);
        let b = [[1.0, 2.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        add_pair_block(&mut h, 0, 0, &b);
        assert_eq!(h[(0, 0)], 2.0);
        assert_eq!(h[(0, 1)], 2.0);
        assert_eq!(h[(1, 0)], 2.0);
        assert_eq!(h, h.transpose());
    }
}

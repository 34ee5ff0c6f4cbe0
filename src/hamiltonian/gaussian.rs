// src/hamiltonian/gaussian.rs
//
// Sum of Gaussians on the unit sphere, used as a synthetic energy landscape for
// testing solvers. Each site sees every Gaussian independently:
//
//   l_k(s) = 1 − c_k · s
//   E      = Σ_sites Σ_k a_k exp(−l_k² / 2σ_k²)
//
// With e_k = exp(−l_k²/2σ_k²):
//   ∂E/∂s        = Σ_k a_k e_k (l_k/σ_k²) c_k
//   ∂²E/∂s∂s     = Σ_k (a_k/σ_k²) e_k (l_k²/σ_k² − 1) c_k c_kᵀ
// There is no coupling between sites, so the Hessian is block diagonal.

use nalgebra::DMatrix;
use rayon::prelude::*;

use super::{assert_field_shape, assert_hessian_shape, Hamiltonian};
use crate::error::{ensure_finite, ensure_len, HamiltonianError, Result};
use crate::params::GaussianParams;
use crate::terms::add_block;
use crate::vec3::{add_scaled, dot, outer, try_normalize, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub struct HamiltonianGaussian {
    boundary_conditions: [bool; 3],
    amplitude: Vec<f64>,
    width: Vec<f64>,
    center: Vec<Vector3>,
}

impl HamiltonianGaussian {
    /// Centres are normalised; widths must be non-zero.
    pub fn new(amplitude: Vec<f64>, width: Vec<f64>, center: Vec<Vector3>) -> Result<Self> {
        let mut h = Self {
            boundary_conditions: [false; 3],
            amplitude: Vec::new(),
            width: Vec::new(),
            center: Vec::new(),
        };
        h.set_gaussians(amplitude, width, center)?;
        Ok(h)
    }

    pub fn from_params(params: GaussianParams) -> Result<Self> {
        Self::new(params.amplitude, params.width, params.center)
    }

    pub fn set_gaussians(&mut self, amplitude: Vec<f64>, width: Vec<f64>, center: Vec<Vector3>) -> Result<()> {
        let n = amplitude.len();
        ensure_len("gaussian widths", n, width.len())?;
        ensure_len("gaussian centers", n, center.len())?;
        for &a in &amplitude {
            ensure_finite(a, "gaussian amplitude")?;
        }
        for (index, &w) in width.iter().enumerate() {
            ensure_finite(w, "gaussian width")?;
            if w == 0.0 {
                return Err(HamiltonianError::ZeroWidth { index });
            }
        }
        let center = center
            .into_iter()
            .map(|c| {
                if !c.iter().all(|x| x.is_finite()) {
                    return Err(HamiltonianError::NonFinite("gaussian center"));
                }
                try_normalize(c).ok_or(HamiltonianError::ZeroDirection("gaussian center"))
            })
            .collect::<Result<Vec<_>>>()?;

        self.amplitude = amplitude;
        self.width = width;
        self.center = center;
        Ok(())
    }

    /// Stored for interface uniformity; the landscape does not depend on them.
    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) {
        self.boundary_conditions = boundary_conditions;
    }

    pub fn n_gaussians(&self) -> usize {
        self.amplitude.len()
    }

    pub fn amplitude(&self) -> &[f64] {
        &self.amplitude
    }

    pub fn width(&self) -> &[f64] {
        &self.width
    }

    pub fn center(&self) -> &[Vector3] {
        &self.center
    }

    fn iter(&self) -> impl Iterator<Item = (f64, f64, Vector3)> + '_ {
        self.amplitude
            .iter()
            .zip(self.width.iter())
            .zip(self.center.iter())
            .map(|((&a, &w), &c)| (a, w, c))
    }
}

impl Hamiltonian for HamiltonianGaussian {
    fn energy_array(&self, spins: &[Vector3]) -> Vec<f64> {
        self.iter()
            .map(|(a, w, c)| {
                let mut e = 0.0;
                for s in spins {
                    let l = 1.0 - dot(c, *s);
                    e += a * (-l * l / (2.0 * w * w)).exp();
                }
                e
            })
            .collect()
    }

    fn contribution_names(&self) -> Vec<String> {
        (0..self.n_gaussians()).map(|k| format!("Gaussian {k}")).collect()
    }

    fn effective_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        assert_field_shape(spins.len(), spins, field);
        field.par_iter_mut().zip(spins.par_iter()).for_each(|(f, s)| {
            *f = [0.0; 3];
            for (a, w, c) in self.iter() {
                let l = 1.0 - dot(c, *s);
                let e = (-l * l / (2.0 * w * w)).exp();
                add_scaled(f, c, -a * e * l / (w * w));
            }
        });
    }

    fn hessian(&self, spins: &[Vector3], hessian: &mut DMatrix<f64>) {
        assert_hessian_shape(spins.len(), spins, hessian);
        hessian.fill(0.0);
        for (site, s) in spins.iter().enumerate() {
            for (a, w, c) in self.iter() {
                let w2 = w * w;
                let l = 1.0 - dot(c, *s);
                let e = (-l * l / (2.0 * w2)).exp();
                add_block(hessian, site, site, &outer(c, c, a / w2 * e * (l * l / w2 - 1.0)));
            }
        }
    }

    fn name(&self) -> &'static str {
        "Gaussian"
    }

    fn boundary_conditions(&self) -> [bool; 3] {
        self.boundary_conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inconsistent_lists() {
        assert!(matches!(
            HamiltonianGaussian::new(vec![1.0, 2.0], vec![1.0], vec![[0.0, 0.0, 1.0]; 2]),
            Err(HamiltonianError::LengthMismatch { .. })
        ));
        assert!(matches!(
            HamiltonianGaussian::new(vec![1.0, 1.0], vec![1.0, 0.0], vec![[0.0, 0.0, 1.0]; 2]),
            Err(HamiltonianError::ZeroWidth { index: 1 })
        ));
        assert!(matches!(
            HamiltonianGaussian::new(vec![1.0], vec![1.0], vec![[0.0; 3]]),
            Err(HamiltonianError::ZeroDirection(_))
        ));
    }

    #[test]
    fn failed_update_keeps_previous_gaussians() {
        let mut h = HamiltonianGaussian::new(vec![1.0], vec![0.3], vec![[1.0, 0.0, 0.0]]).unwrap();
        assert!(h.set_gaussians(vec![1.0], vec![0.0], vec![[0.0, 0.0, 1.0]]).is_err());
        assert_eq!(h.n_gaussians(), 1);
        assert_eq!(h.center(), &[[1.0, 0.0, 0.0]]);
    }

    #[test]
    fn one_entry_per_gaussian() {
        let h = HamiltonianGaussian::new(
            vec![1.0, -0.5],
            vec![0.4, 0.8],
            vec![[0.0, 0.0, 1.0], [0.0, 0.0, -1.0]],
        )
        .unwrap();
        let spins = [[0.0, 0.0, 1.0]];
        let parts = h.energy_array(&spins);
        assert_eq!(h.contribution_names(), vec!["Gaussian 0", "Gaussian 1"]);
        assert_eq!(parts.len(), 2);
        // on the first centre: l = 0 → full amplitude
        assert_eq!(parts[0], 1.0);
        // opposite centre: l = 2
        assert!((parts[1] - (-0.5 * (-4.0 / (2.0 * 0.64_f64)).exp())).abs() < 1e-15);
    }

    #[test]
    fn field_vanishes_on_a_centre() {
        let h = HamiltonianGaussian::new(vec![2.0], vec![1.0], vec![[0.0, 1.0, 0.0]]).unwrap();
        let mut field = [[1.0; 3]];
        h.effective_field(&[[0.0, 1.0, 0.0]], &mut field);
        assert_eq!(field[0], [0.0; 3]);
    }
}

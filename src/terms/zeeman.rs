// src/terms/zeeman.rs

use rayon::prelude::*;

use crate::vec3::{dot, Vector3};

/// Uniform external field. `magnitude` is already in meV per μ_B (Tesla × MU_B).
///
///   E = −Σ_i μ_s,i B (s_i · n)
///   B_i = μ_s,i B n
///
/// Linear in the spins, so there is no Hessian contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZeemanTerm {
    pub magnitude: f64,
    pub normal: Vector3,
}

impl Default for ZeemanTerm {
    fn default() -> Self {
        Self {
            magnitude: 0.0,
            normal: [0.0, 0.0, 1.0],
        }
    }
}

impl ZeemanTerm {
    pub fn is_zero(&self) -> bool {
        self.magnitude == 0.0
    }

    pub fn energy(&self, spins: &[Vector3], mu_s: &[f64]) -> f64 {
        let mut e = 0.0;
        for (s, &mu) in spins.iter().zip(mu_s.iter()) {
            e -= mu * self.magnitude * dot(*s, self.normal);
        }
        e
    }

    /// Sites are independent, so this runs in parallel without changing the result.
    pub fn add_field(&self, field: &mut [Vector3], mu_s: &[f64]) {
        let b = self.magnitude;
        let n = self.normal;
        field.par_iter_mut().zip(mu_s.par_iter()).for_each(|(f, &mu)| {
            f[0] += mu * b * n[0];
            f[1] += mu * b * n[1];
            f[2] += mu * b * n[2];
        });
    }
}

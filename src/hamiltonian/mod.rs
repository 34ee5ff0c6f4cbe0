// src/hamiltonian/mod.rs
//
// The Hamiltonian contract and the closed set of concrete models.
//
// Evaluation takes `&self` and reads only the spins and the stored parameters, so a
// Hamiltonian can be evaluated from several threads at once. Mutation goes through
// the setters, which validate their input and rebuild every derived list before
// returning.
pub mod gaussian;
pub mod heisenberg;

pub use gaussian::HamiltonianGaussian;
pub use heisenberg::{Contribution, HamiltonianHeisenberg};

use nalgebra::DMatrix;

use crate::error::{HamiltonianError, Result};
use crate::params::{Chirality, DmiPair, ExchangePair};
use crate::vec3::Vector3;

/// Energy functional of a spin configuration and its first two derivatives.
pub trait Hamiltonian: Send + Sync {
    /// Energy split into the active contributions, in a stable order.
    fn energy_array(&self, spins: &[Vector3]) -> Vec<f64>;

    /// Total energy; always the ordered sum of [`Hamiltonian::energy_array`].
    fn energy(&self, spins: &[Vector3]) -> f64 {
        self.energy_array(spins).iter().sum()
    }

    /// Labels of the entries of [`Hamiltonian::energy_array`].
    fn contribution_names(&self) -> Vec<String>;

    fn energy_contributions(&self, spins: &[Vector3]) -> Vec<(String, f64)> {
        self.contribution_names()
            .into_iter()
            .zip(self.energy_array(spins))
            .collect()
    }

    /// Overwrite `field` with −∂E/∂s_i for every site (raw Euclidean gradient, not
    /// projected onto the tangent planes).
    fn effective_field(&self, spins: &[Vector3], field: &mut [Vector3]);

    /// Overwrite `hessian` (3N × 3N) with ∂²E/∂x_a∂x_b of the flattened spin vector.
    fn hessian(&self, spins: &[Vector3], hessian: &mut DMatrix<f64>);

    fn name(&self) -> &'static str;

    fn boundary_conditions(&self) -> [bool; 3];
}

/// Preconditions shared by every evaluation.
pub(crate) fn assert_field_shape(nos: usize, spins: &[Vector3], field: &[Vector3]) {
    assert_eq!(spins.len(), nos, "spin configuration has the wrong number of sites");
    assert_eq!(field.len(), nos, "effective field has the wrong number of sites");
}

pub(crate) fn assert_hessian_shape(nos: usize, spins: &[Vector3], hessian: &DMatrix<f64>) {
    assert_eq!(spins.len(), nos, "spin configuration has the wrong number of sites");
    assert!(
        hessian.nrows() == 3 * nos && hessian.ncols() == 3 * nos,
        "hessian must be {0}×{0}, got {1}×{2}",
        3 * nos,
        hessian.nrows(),
        hessian.ncols()
    );
}

/// Which model an [`AnyHamiltonian`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HamiltonianKind {
    Heisenberg,
    Gaussian,
}

impl HamiltonianKind {
    pub fn name(self) -> &'static str {
        match self {
            HamiltonianKind::Heisenberg => "Heisenberg",
            HamiltonianKind::Gaussian => "Gaussian",
        }
    }
}

/// One Hamiltonian per image, selected at construction.
#[derive(Debug, Clone)]
pub enum AnyHamiltonian {
    Heisenberg(HamiltonianHeisenberg),
    Gaussian(HamiltonianGaussian),
}

impl From<HamiltonianHeisenberg> for AnyHamiltonian {
    fn from(h: HamiltonianHeisenberg) -> Self {
        AnyHamiltonian::Heisenberg(h)
    }
}

impl From<HamiltonianGaussian> for AnyHamiltonian {
    fn from(h: HamiltonianGaussian) -> Self {
        AnyHamiltonian::Gaussian(h)
    }
}

impl AnyHamiltonian {
    pub fn kind(&self) -> HamiltonianKind {
        match self {
            AnyHamiltonian::Heisenberg(_) => HamiltonianKind::Heisenberg,
            AnyHamiltonian::Gaussian(_) => HamiltonianKind::Gaussian,
        }
    }

    fn inner(&self) -> &dyn Hamiltonian {
        match self {
            AnyHamiltonian::Heisenberg(h) => h as &dyn Hamiltonian,
            AnyHamiltonian::Gaussian(h) => h as &dyn Hamiltonian,
        }
    }

    pub fn as_heisenberg(&self) -> Option<&HamiltonianHeisenberg> {
        match self {
            AnyHamiltonian::Heisenberg(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_gaussian(&self) -> Option<&HamiltonianGaussian> {
        match self {
            AnyHamiltonian::Gaussian(h) => Some(h),
            _ => None,
        }
    }

    /// Run `f` on the Heisenberg model, or report `operation` as unsupported.
    fn heisenberg_mut<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut HamiltonianHeisenberg) -> Result<T>,
    ) -> Result<T> {
        match self {
            AnyHamiltonian::Heisenberg(h) => f(h),
            other => Err(HamiltonianError::Unsupported {
                operation,
                hamiltonian: other.kind().name(),
            }),
        }
    }

    /// Boundary conditions exist on every model.
    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) -> Result<()> {
        match self {
            AnyHamiltonian::Heisenberg(h) => h.set_boundary_conditions(boundary_conditions),
            AnyHamiltonian::Gaussian(h) => {
                h.set_boundary_conditions(boundary_conditions);
                Ok(())
            }
        }
    }

    pub fn set_mu_s(&mut self, mu_s: f64) -> Result<()> {
        self.heisenberg_mut("mu_s", |h| h.set_mu_s(mu_s))
    }

    /// `magnitude` in Tesla; `normal` is normalised.
    pub fn set_external_field(&mut self, magnitude: f64, normal: Vector3) -> Result<()> {
        self.heisenberg_mut("External field", |h| h.set_external_field(magnitude, normal))
    }

    pub fn set_anisotropy(&mut self, magnitude: f64, normal: Vector3) -> Result<()> {
        self.heisenberg_mut("Anisotropy", |h| h.set_anisotropy(magnitude, normal))
    }

    pub fn set_exchange_shells(&mut self, magnitudes: Vec<f64>) -> Result<()> {
        self.heisenberg_mut("Exchange", |h| h.set_exchange_shells(magnitudes))
    }

    pub fn set_dmi_shells(&mut self, magnitudes: Vec<f64>, chirality: i32) -> Result<()> {
        self.heisenberg_mut("DMI", |h| {
            let chirality = Chirality::try_from(chirality)?;
            h.set_dmi_shells(magnitudes, chirality)
        })
    }

    pub fn set_ddi_radius(&mut self, radius: f64) -> Result<()> {
        self.heisenberg_mut("DDI", |h| h.set_ddi_radius(radius))
    }

    pub fn set_mu_s_per_atom(&mut self, mu_s: Vec<f64>) -> Result<()> {
        self.heisenberg_mut("mu_s", |h| h.set_mu_s_per_atom(mu_s))
    }

    pub fn set_anisotropy_sites(
        &mut self,
        indices: Vec<usize>,
        magnitudes: Vec<f64>,
        normals: Vec<Vector3>,
    ) -> Result<()> {
        self.heisenberg_mut("Anisotropy", |h| h.set_anisotropy_sites(indices, magnitudes, normals))
    }

    pub fn set_exchange_pairs(&mut self, pairs: Vec<ExchangePair>) -> Result<()> {
        self.heisenberg_mut("Exchange", |h| h.set_exchange_pairs(pairs))
    }

    pub fn set_dmi_pairs(&mut self, pairs: Vec<DmiPair>) -> Result<()> {
        self.heisenberg_mut("DMI", |h| h.set_dmi_pairs(pairs))
    }
}

impl Hamiltonian for AnyHamiltonian {
    fn energy_array(&self, spins: &[Vector3]) -> Vec<f64> {
        self.inner().energy_array(spins)
    }

    fn energy(&self, spins: &[Vector3]) -> f64 {
        self.inner().energy(spins)
    }

    fn contribution_names(&self) -> Vec<String> {
        self.inner().contribution_names()
    }

    fn effective_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        self.inner().effective_field(spins, field)
    }

    fn hessian(&self, spins: &[Vector3], hessian: &mut DMatrix<f64>) {
        self.inner().hessian(spins, hessian)
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn boundary_conditions(&self) -> [bool; 3] {
        self.inner().boundary_conditions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian() -> AnyHamiltonian {
        HamiltonianGaussian::new(vec![1.0], vec![0.5], vec![[0.0, 0.0, 1.0]])
            .unwrap()
            .into()
    }

    #[test]
    fn heisenberg_only_setters_are_unsupported_on_gaussian() {
        let mut h = gaussian();
        let before = h.as_gaussian().cloned();

        let err = h.set_mu_s(2.0).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(err.to_string(), "mu_s cannot be set on Gaussian");
        assert!(h.set_external_field(1.0, [0.0, 0.0, 1.0]).unwrap_err().is_unsupported());
        assert!(h.set_anisotropy(1.0, [0.0, 0.0, 1.0]).unwrap_err().is_unsupported());
        assert!(h.set_exchange_shells(vec![1.0]).unwrap_err().is_unsupported());
        assert!(h.set_dmi_shells(vec![1.0], 1).unwrap_err().is_unsupported());
        assert!(h.set_ddi_radius(2.0).unwrap_err().is_unsupported());
        assert!(h.set_mu_s_per_atom(vec![1.0]).unwrap_err().is_unsupported());
        assert!(h
            .set_anisotropy_sites(vec![0], vec![1.0], vec![[0.0, 0.0, 1.0]])
            .unwrap_err()
            .is_unsupported());
        assert!(h.set_exchange_pairs(Vec::new()).unwrap_err().is_unsupported());
        assert!(h.set_dmi_pairs(Vec::new()).unwrap_err().is_unsupported());

        assert_eq!(h.as_gaussian().cloned(), before);
        assert_eq!(h.kind(), HamiltonianKind::Gaussian);
        assert_eq!(h.name(), "Gaussian");
    }

    #[test]
    fn boundary_conditions_apply_to_every_model() {
        let mut h = gaussian();
        h.set_boundary_conditions([true, false, true]).unwrap();
        assert_eq!(h.boundary_conditions(), [true, false, true]);
    }

    #[test]
    fn explicit_pair_setters_reach_the_heisenberg_model() {
        use crate::geometry::Geometry;
        use crate::neighbours::Pair;
        use crate::params::HeisenbergParams;
        use std::sync::Arc;

        let geometry = Arc::new(Geometry::simple_cubic([3, 1, 1], 1.0).unwrap());
        let params = HeisenbergParams {
            boundary_conditions: [false; 3],
            ..HeisenbergParams::default()
        };
        let mut h: AnyHamiltonian = HamiltonianHeisenberg::new(geometry, params).unwrap().into();

        h.set_mu_s_per_atom(vec![2.0]).unwrap();
        h.set_anisotropy_sites(vec![1], vec![0.5], vec![[1.0, 0.0, 0.0]]).unwrap();
        h.set_exchange_pairs(vec![ExchangePair {
            pair: Pair::new(2, 1, [0, 0, 0]),
            magnitude: 1.0,
        }])
        .unwrap();
        h.set_dmi_pairs(vec![DmiPair {
            pair: Pair::new(0, 2, [0, 0, 0]),
            magnitude: 0.1,
            normal: [0.0, 1.0, 0.0],
        }])
        .unwrap();

        let hh = h.as_heisenberg().unwrap();
        assert_eq!(hh.mu_s(), &[2.0]);
        assert_eq!(hh.anisotropy(), (0.5, [1.0, 0.0, 0.0]));
        assert_eq!(hh.exchange_pairs().pairs, vec![Pair::new(1, 2, [0, 0, 0])]);
        assert_eq!(hh.dmi_pairs().pairs, vec![Pair::new(0, 2, [0, 0, 0])]);
        assert_eq!(h.contribution_names(), vec!["Anisotropy", "Exchange", "DMI"]);
    }
}

// src/image.rs
//
// One system image: geometry, spin configuration and Hamiltonian behind per-image
// locks. This is the surface host code talks to.
//
// Setters hold the Hamiltonian write guard for the whole validate-and-rebuild step,
// so readers never observe a half-updated pair list. A Heisenberg-only setter called
// on a Gaussian image logs a warning and leaves everything untouched.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{info, warn};

use crate::error::{ensure_len, Result};
use crate::geometry::Geometry;
use crate::hamiltonian::{AnyHamiltonian, Hamiltonian, HamiltonianKind};
use crate::vec3::Vector3;
use crate::vector_field::VectorField;

#[derive(Debug)]
pub struct Image {
    pub index: usize,
    geometry: Arc<Geometry>,
    hamiltonian: RwLock<AnyHamiltonian>,
    spins: RwLock<VectorField>,
}

impl Image {
    /// Spins start aligned along +z. A Heisenberg model must be built on a geometry
    /// with the same number of sites.
    pub fn new(index: usize, geometry: Arc<Geometry>, hamiltonian: AnyHamiltonian) -> Result<Self> {
        if let Some(h) = hamiltonian.as_heisenberg() {
            ensure_len("image sites", h.nos(), geometry.nos())?;
        }
        let spins = VectorField::new(geometry.nos());
        Ok(Self {
            index,
            geometry,
            hamiltonian: RwLock::new(hamiltonian),
            spins: RwLock::new(spins),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn nos(&self) -> usize {
        self.geometry.nos()
    }

    /// A panic while a guard was held cannot leave the Hamiltonian half-built (setters
    /// validate before mutating), so poisoned locks are simply recovered.
    pub fn hamiltonian(&self) -> RwLockReadGuard<'_, AnyHamiltonian> {
        self.hamiltonian.read().unwrap_or_else(|e| e.into_inner())
    }

    fn hamiltonian_mut(&self) -> RwLockWriteGuard<'_, AnyHamiltonian> {
        self.hamiltonian.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn spins(&self) -> RwLockReadGuard<'_, VectorField> {
        self.spins.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn spins_mut(&self) -> RwLockWriteGuard<'_, VectorField> {
        self.spins.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `f` under the write lock; unsupported operations become a warning.
    fn update(&self, f: impl FnOnce(&mut AnyHamiltonian) -> Result<()>) -> Result<()> {
        let mut h = self.hamiltonian_mut();
        match f(&mut *h) {
            Err(e) if e.is_unsupported() => {
                warn!("image {}: {}", self.index, e);
                Ok(())
            }
            other => other,
        }
    }

    // ---- setters ----

    pub fn set_boundary_conditions(&self, boundary_conditions: [bool; 3]) -> Result<()> {
        self.update(|h| h.set_boundary_conditions(boundary_conditions))?;
        info!(
            "image {}: set boundary conditions to {:?}",
            self.index, boundary_conditions
        );
        Ok(())
    }

    pub fn set_mu_s(&self, mu_s: f64) -> Result<()> {
        self.update(|h| {
            h.set_mu_s(mu_s)?;
            info!("image {}: set mu_s to {}", self.index, mu_s);
            Ok(())
        })
    }

    /// Field magnitude in Tesla.
    pub fn set_field(&self, magnitude: f64, normal: Vector3) -> Result<()> {
        self.update(|h| {
            h.set_external_field(magnitude, normal)?;
            info!(
                "image {}: set external field to {} T, direction {:?}",
                self.index, magnitude, normal
            );
            Ok(())
        })
    }

    pub fn set_anisotropy(&self, magnitude: f64, normal: Vector3) -> Result<()> {
        self.update(|h| {
            h.set_anisotropy(magnitude, normal)?;
            info!(
                "image {}: set anisotropy to {}, direction {:?}",
                self.index, magnitude, normal
            );
            Ok(())
        })
    }

    pub fn set_exchange(&self, shells: &[f64]) -> Result<()> {
        self.update(|h| {
            h.set_exchange_shells(shells.to_vec())?;
            info!("image {}: set exchange to {} shells {:?}", self.index, shells.len(), shells);
            Ok(())
        })
    }

    /// `chirality`: ±1 Bloch, ±2 Néel.
    pub fn set_dmi(&self, shells: &[f64], chirality: i32) -> Result<()> {
        self.update(|h| {
            h.set_dmi_shells(shells.to_vec(), chirality)?;
            info!(
                "image {}: set DMI to {} shells {:?}, chirality {}",
                self.index,
                shells.len(),
                shells,
                chirality
            );
            Ok(())
        })
    }

    pub fn set_ddi(&self, radius: f64) -> Result<()> {
        self.update(|h| {
            h.set_ddi_radius(radius)?;
            info!("image {}: set DDI cutoff radius to {}", self.index, radius);
            Ok(())
        })
    }

    // ---- getters ----

    pub fn name(&self) -> &'static str {
        self.hamiltonian().name()
    }

    pub fn kind(&self) -> HamiltonianKind {
        self.hamiltonian().kind()
    }

    pub fn boundary_conditions(&self) -> [bool; 3] {
        self.hamiltonian().boundary_conditions()
    }

    pub fn mu_s(&self) -> Option<Vec<f64>> {
        self.hamiltonian().as_heisenberg().map(|h| h.mu_s().to_vec())
    }

    /// (Tesla, direction)
    pub fn field(&self) -> Option<(f64, Vector3)> {
        self.hamiltonian().as_heisenberg().map(|h| h.external_field())
    }

    pub fn anisotropy(&self) -> Option<(f64, Vector3)> {
        self.hamiltonian().as_heisenberg().map(|h| h.anisotropy())
    }

    pub fn exchange_shells(&self) -> Option<Vec<f64>> {
        self.hamiltonian()
            .as_heisenberg()
            .map(|h| h.exchange_shell_magnitudes().to_vec())
    }

    /// Fetching explicit exchange pairs is not available through an image.
    pub fn exchange_n_pairs(&self) -> usize {
        warn!(
            "image {}: {} Hamiltonian: fetching exchange pairs is not yet implemented",
            self.index,
            self.name()
        );
        0
    }

    /// (shell magnitudes, chirality)
    pub fn dmi_shells(&self) -> Option<(Vec<f64>, i32)> {
        self.hamiltonian().as_heisenberg().map(|h| {
            let (magnitudes, chirality) = h.dmi_shells();
            (magnitudes.to_vec(), chirality.into())
        })
    }

    /// Fetching explicit DMI pairs is not available through an image.
    pub fn dmi_n_pairs(&self) -> usize {
        warn!(
            "image {}: {} Hamiltonian: fetching DMI pairs is not yet implemented",
            self.index,
            self.name()
        );
        0
    }

    pub fn ddi_radius(&self) -> Option<f64> {
        self.hamiltonian().as_heisenberg().map(|h| h.ddi_cutoff_radius())
    }

    // ---- evaluation on the current spins ----

    pub fn energy(&self) -> f64 {
        let h = self.hamiltonian();
        let spins = self.spins();
        h.energy(spins.as_slice())
    }

    pub fn energy_contributions(&self) -> Vec<(String, f64)> {
        let h = self.hamiltonian();
        let spins = self.spins();
        h.energy_contributions(spins.as_slice())
    }

    pub fn effective_field(&self) -> VectorField {
        let h = self.hamiltonian();
        let spins = self.spins();
        let mut field = VectorField::zeros(spins.len());
        h.effective_field(spins.as_slice(), field.as_mut_slice());
        field
    }
}

// src/config.rs
//
// JSON description of a system: a geometry plus one Hamiltonian.
//
// {
//   "geometry":    { "bravais_vectors": [...], "cell_atoms": [...], "n_cells": [..] },
//   "hamiltonian": { "type": "Heisenberg", "mu_s": [1.0], "exchange": {"Shells": [1.0]}, ... }
// }
//
// Reading and writing files is left to the caller.

use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Geometry, GeometryConfig};
use crate::hamiltonian::{AnyHamiltonian, HamiltonianGaussian, HamiltonianHeisenberg};
use crate::params::{GaussianParams, HeisenbergParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HamiltonianConfig {
    Heisenberg(HeisenbergParams),
    Gaussian(GaussianParams),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub geometry: GeometryConfig,
    pub hamiltonian: HamiltonianConfig,
}

impl SystemConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate everything and construct the geometry and Hamiltonian.
    pub fn build(&self) -> Result<(Arc<Geometry>, AnyHamiltonian)> {
        let geometry = Arc::new(Geometry::try_from(&self.geometry)?);
        let hamiltonian: AnyHamiltonian = match &self.hamiltonian {
            HamiltonianConfig::Heisenberg(p) => {
                HamiltonianHeisenberg::new(Arc::clone(&geometry), p.clone())?.into()
            }
            HamiltonianConfig::Gaussian(p) => HamiltonianGaussian::from_params(p.clone())?.into(),
        };
        info!(
            "built {} hamiltonian on {} sites ({:?} cells, {} basis atoms)",
            hamiltonian.kind().name(),
            geometry.nos(),
            geometry.n_cells,
            geometry.n_cell_atoms()
        );
        Ok((geometry, hamiltonian))
    }
}

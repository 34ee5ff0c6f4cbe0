// src/params.rs
//
// Physical constants and the parameter bundles used to construct Hamiltonians.
//
// Units: energies in meV, lengths in Ångström, fields in Tesla, moments in μ_B.

use serde::{Deserialize, Serialize};

use crate::error::HamiltonianError;
use crate::neighbours::Pair;
use crate::vec3::Vector3;

/// Bohr magneton in meV/T.
pub const MU_B: f64 = 0.057_883_818_060;

/// μ0 μ_B² / (4π Å³) in meV: dipolar coupling of two 1 μ_B moments 1 Å apart.
pub const DIPOLAR_PREFACTOR: f64 = 0.053_681_511_206;

/// Handedness of DMI vectors built from neighbour shells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Chirality {
    /// D ∥ r̂ (+1)
    Bloch,
    /// D ∥ −r̂ (−1)
    BlochInverse,
    /// D ∥ ẑ × r̂ (+2)
    Neel,
    /// D ∥ −ẑ × r̂ (−2)
    NeelInverse,
}

impl Chirality {
    /// Sign applied to the DMI direction.
    pub fn sign(self) -> f64 {
        match self {
            Chirality::Bloch | Chirality::Neel => 1.0,
            Chirality::BlochInverse | Chirality::NeelInverse => -1.0,
        }
    }

    pub fn is_neel(self) -> bool {
        matches!(self, Chirality::Neel | Chirality::NeelInverse)
    }
}

impl TryFrom<i32> for Chirality {
    type Error = HamiltonianError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Chirality::Bloch),
            -1 => Ok(Chirality::BlochInverse),
            2 => Ok(Chirality::Neel),
            -2 => Ok(Chirality::NeelInverse),
            other => Err(HamiltonianError::InvalidChirality(other)),
        }
    }
}

impl From<Chirality> for i32 {
    fn from(c: Chirality) -> i32 {
        match c {
            Chirality::Bloch => 1,
            Chirality::BlochInverse => -1,
            Chirality::Neel => 2,
            Chirality::NeelInverse => -2,
        }
    }
}

/// An explicit exchange bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangePair {
    pub pair: Pair,
    pub magnitude: f64,
}

/// An explicit DMI bond with its own direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DmiPair {
    pub pair: Pair,
    pub magnitude: f64,
    pub normal: Vector3,
}

/// Exchange is given either per neighbour shell or as an explicit bond list, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Exchange {
    Shells(Vec<f64>),
    Pairs(Vec<ExchangePair>),
}

impl Default for Exchange {
    fn default() -> Self {
        Exchange::Shells(Vec::new())
    }
}

/// DMI is given either per neighbour shell (with a chirality) or as explicit bonds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dmi {
    Shells {
        magnitudes: Vec<f64>,
        chirality: Chirality,
    },
    Pairs(Vec<DmiPair>),
}

impl Default for Dmi {
    fn default() -> Self {
        Dmi::Shells {
            magnitudes: Vec::new(),
            chirality: Chirality::Bloch,
        }
    }
}

/// Per-site uniaxial anisotropy lists (all three of equal length).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnisotropyParams {
    pub indices: Vec<usize>,
    pub magnitudes: Vec<f64>,
    pub normals: Vec<Vector3>,
}

/// Everything needed to build a Heisenberg Hamiltonian on a given geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeisenbergParams {
    pub boundary_conditions: [bool; 3],
    /// One moment per unit-cell atom (μ_B).
    pub mu_s: Vec<f64>,
    /// External field in Tesla.
    pub external_field_magnitude: f64,
    pub external_field_normal: Vector3,
    pub anisotropy: AnisotropyParams,
    pub exchange: Exchange,
    pub dmi: Dmi,
    /// Dipolar cutoff radius (Å); 0 disables DDI.
    pub ddi_radius: f64,
}

impl Default for HeisenbergParams {
    fn default() -> Self {
        Self {
            boundary_conditions: [true, true, true],
            mu_s: vec![1.0],
            external_field_magnitude: 0.0,
            external_field_normal: [0.0, 0.0, 1.0],
            anisotropy: AnisotropyParams::default(),
            exchange: Exchange::default(),
            dmi: Dmi::default(),
            ddi_radius: 0.0,
        }
    }
}

/// Gaussian landscape: three lists of equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GaussianParams {
    pub amplitude: Vec<f64>,
    pub width: Vec<f64>,
    pub center: Vec<Vector3>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chirality_round_trips_through_i32() {
        for c in [
            Chirality::Bloch,
            Chirality::BlochInverse,
            Chirality::Neel,
            Chirality::NeelInverse,
        ] {
            assert_eq!(Chirality::try_from(i32::from(c)).unwrap(), c);
        }
        assert!(matches!(
            Chirality::try_from(3),
            Err(HamiltonianError::InvalidChirality(3))
        ));
    }

    #[test]
    fn dipolar_prefactor_matches_bohr_magneton() {
        // μ0/4π = 1e-7 T m/A and μ_B = MU_B meV/T, so C = 1e-7 μ_B² / Å³ converted to meV.
        let mu_b_joule = 9.274_010_078_3e-24;
        let mev = 1.602_176_634e-22;
        let c = 1e-7 * mu_b_joule * mu_b_joule / 1e-30 / mev;
        assert!((c - DIPOLAR_PREFACTOR).abs() < 1e-10);
        assert!((mu_b_joule / mev - MU_B).abs() < 1e-10);
    }
}

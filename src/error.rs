// src/error.rs

use crate::neighbours::Pair;

/// Conditions raised at the construction/mutation boundary of a Hamiltonian.
///
/// Evaluation (`energy`, `effective_field`, `hessian`) never produces these: anything
/// that could go wrong is rejected when the parameters are set.
#[derive(Debug, thiserror::Error)]
pub enum HamiltonianError {
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("gaussian {index} has zero width")]
    ZeroWidth { index: usize },

    #[error("negative cutoff radius: {0}")]
    NegativeRadius(f64),

    #[error("non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("direction vector for {0} has zero length")]
    ZeroDirection(&'static str),

    #[error("site index {index} out of range for {nos} sites")]
    SiteOutOfRange { index: usize, nos: usize },

    #[error("pair {0:?} couples a site to itself")]
    SelfPair(Pair),

    #[error("bond {0:?} is given more than once")]
    DuplicatePair(Pair),

    #[error("cutoff radius {radius} needs a search window of {window} cells, more than {max}")]
    RadiusTooLarge { radius: f64, window: i32, max: i32 },

    #[error("invalid DMI chirality {0} (expected ±1 for Bloch or ±2 for Néel)")]
    InvalidChirality(i32),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("{operation} cannot be set on {hamiltonian}")]
    Unsupported {
        operation: &'static str,
        hamiltonian: &'static str,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl HamiltonianError {
    /// Unsupported operations are reported as warnings, everything else is an error.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, HamiltonianError::Unsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, HamiltonianError>;

pub(crate) fn ensure_finite(value: f64, what: &'static str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(HamiltonianError::NonFinite(what))
    }
}

pub(crate) fn ensure_len(what: &'static str, expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(HamiltonianError::LengthMismatch { what, expected, got })
    }
}

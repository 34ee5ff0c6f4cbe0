// src/lib.rs

pub mod config;
pub mod error;
pub mod geometry;
pub mod hamiltonian;
pub mod image;
pub mod initial_states;
pub mod manifold;
pub mod neighbours;
pub mod params;
pub mod terms;
pub mod vec3;
pub mod vector_field;

pub use error::{HamiltonianError, Result};
pub use geometry::Geometry;
pub use hamiltonian::{AnyHamiltonian, Hamiltonian, HamiltonianGaussian, HamiltonianHeisenberg, HamiltonianKind};
pub use image::Image;

// src/initial_states.rs
//
// Spin configuration seeds: uniform, noisy-uniform, random and spin spirals.
//
// All generators write unit vectors. Random seeds are reproducible for a given `seed`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::geometry::Geometry;
use crate::vec3::{dot, normalize, Vector3};
use crate::vector_field::VectorField;

/// Set a uniform direction (normalized).
pub fn init_uniform(m: &mut VectorField, dir: Vector3) {
    let v = normalize(dir);
    m.set_uniform(v[0], v[1], v[2]);
}

/// Uniform + small random tilt (useful to break symmetry).
pub fn init_uniform_with_noise(m: &mut VectorField, dir: Vector3, noise: f64, seed: u64) {
    let base = normalize(dir);
    let mut rng = StdRng::seed_from_u64(seed);
    for v in &mut m.data {
        let dx = noise * rng.gen_range(-1.0..1.0);
        let dy = noise * rng.gen_range(-1.0..1.0);
        let dz = noise * rng.gen_range(-1.0..1.0);
        *v = normalize([base[0] + dx, base[1] + dy, base[2] + dz]);
    }
}

/// Directions uniformly distributed on the sphere (normalised Gaussian triples).
pub fn init_random(m: &mut VectorField, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    for v in &mut m.data {
        let x: f64 = rng.sample(StandardNormal);
        let y: f64 = rng.sample(StandardNormal);
        let z: f64 = rng.sample(StandardNormal);
        *v = normalize([x, y, z]);
    }
}

/// Flat spin spiral: the spin at position r rotates by q·r in the plane spanned by
/// `axis_1` and `axis_2` (both normalised, expected orthogonal).
pub fn init_spiral(m: &mut VectorField, geometry: &Geometry, q: Vector3, axis_1: Vector3, axis_2: Vector3) {
    assert_eq!(m.len(), geometry.nos());
    let e1 = normalize(axis_1);
    let e2 = normalize(axis_2);
    for (v, r) in m.data.iter_mut().zip(geometry.positions.iter()) {
        let phase = dot(q, *r);
        let (s, c) = phase.sin_cos();
        *v = normalize([
            c * e1[0] + s * e2[0],
            c * e1[1] + s * e2[1],
            c * e1[2] + s * e2[2],
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_state_is_reproducible_and_normalised() {
        let mut a = VectorField::new(32);
        let mut b = VectorField::new(32);
        init_random(&mut a, 7);
        init_random(&mut b, 7);
        assert_eq!(a, b);
        for v in &a.data {
            assert!((dot(*v, *v) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn spiral_rotates_by_q_per_cell() {
        let g = Geometry::simple_cubic([4, 1, 1], 1.0).unwrap();
        let mut m = VectorField::new(g.nos());
        let q = [std::f64::consts::FRAC_PI_2, 0.0, 0.0];
        init_spiral(&mut m, &g, q, [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        assert!((m.data[0][2] - 1.0).abs() < 1e-12);
        assert!((m.data[1][0] - 1.0).abs() < 1e-12);
        assert!((m.data[2][2] + 1.0).abs() < 1e-12);
    }
}

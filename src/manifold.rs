// src/manifold.rs
//
// Helpers that treat a spin configuration as a point on the product of N unit spheres.
//
// The Hamiltonians return raw Euclidean gradients; callers that need the spherical
// constraint project with `project_tangential`.

use crate::vec3::{dot, Vector3};

/// Norm of a vector field interpreted as one 3N-vector.
pub fn norm(vf: &[Vector3]) -> f64 {
    vf.iter().map(|v| dot(*v, *v)).sum::<f64>().sqrt()
}

/// Remove from each vector of `vf` its component along the matching unit vector of `spins`.
pub fn project_tangential(vf: &mut [Vector3], spins: &[Vector3]) {
    assert_eq!(vf.len(), spins.len());
    for (v, s) in vf.iter_mut().zip(spins.iter()) {
        let p = dot(*v, *s);
        v[0] -= p * s[0];
        v[1] -= p * s[1];
        v[2] -= p * s[2];
    }
}

/// Great-circle distance between two unit vectors.
pub fn dist_greatcircle(v1: Vector3, v2: Vector3) -> f64 {
    dot(v1, v2).clamp(-1.0, 1.0).acos()
}

/// Geodesic distance between two configurations on the product of spheres.
pub fn dist_geodesic(v1: &[Vector3], v2: &[Vector3]) -> f64 {
    assert_eq!(v1.len(), v2.len());
    v1.iter()
        .zip(v2.iter())
        .map(|(a, b)| {
            let d = dist_greatcircle(*a, *b);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_removes_parallel_part() {
        let spins = [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let mut vf = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        project_tangential(&mut vf, &spins);
        assert_eq!(vf, [[1.0, 2.0, 0.0], [0.0, 5.0, 6.0]]);
    }

    #[test]
    fn geodesic_distance_of_orthogonal_sites() {
        let a = [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0]];
        let b = [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let d = dist_geodesic(&a, &b);
        assert!((d - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((dist_greatcircle([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]) - std::f64::consts::PI).abs() < 1e-12);
        assert!((norm(&b) - 2.0_f64.sqrt()).abs() < 1e-12);
    }
}

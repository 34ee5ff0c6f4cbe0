// src/vector_field.rs

use crate::vec3::{normalize, Vector3};

/// One 3-vector per lattice site (spin directions or effective fields).
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pub data: Vec<Vector3>,
}

impl VectorField {
    /// Create a new field of `nos` vectors, initialised along +z.
    pub fn new(nos: usize) -> Self {
        Self {
            data: vec![[0.0, 0.0, 1.0]; nos],
        }
    }

    /// A field of `nos` zero vectors.
    pub fn zeros(nos: usize) -> Self {
        Self {
            data: vec![[0.0; 3]; nos],
        }
    }

    /// Set all sites to the same vector (mx, my, mz).
    pub fn set_uniform(&mut self, mx: f64, my: f64, mz: f64) {
        for cell in &mut self.data {
            *cell = [mx, my, mz];
        }
    }

    /// Renormalise every vector to unit length (zero vectors become +z).
    pub fn normalize(&mut self) {
        for v in &mut self.data {
            *v = normalize(*v);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vector3] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Vector3] {
        &mut self.data
    }
}

impl From<Vec<Vector3>> for VectorField {
    fn from(data: Vec<Vector3>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_field_points_up_and_normalize_keeps_unit_length() {
        let mut m = VectorField::new(4);
        assert!(m.data.iter().all(|v| *v == [0.0, 0.0, 1.0]));

        m.set_uniform(3.0, 0.0, 4.0);
        m.normalize();
        for v in &m.data {
            let norm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((norm - 1.0).abs() < 1e-12, "norm not ~1 (got {})", norm);
        }
        assert!((m.data[0][0] - 0.6).abs() < 1e-12);
    }
}

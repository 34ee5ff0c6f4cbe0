// src/vec3.rs

/// A 3-component vector (spin direction, position, field).
pub type Vector3 = [f64; 3];

/// A 3×3 block, row-major.
pub type Block3 = [[f64; 3]; 3];

/// 3D vector dot product.
#[inline]
pub fn dot(a: Vector3, b: Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 3D vector cross product: a × b.
#[inline]
pub fn cross(a: Vector3, b: Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn add(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vector3, b: Vector3) -> Vector3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vector3, s: f64) -> Vector3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

/// `acc += s * a`
#[inline]
pub fn add_scaled(acc: &mut Vector3, a: Vector3, s: f64) {
    acc[0] += s * a[0];
    acc[1] += s * a[1];
    acc[2] += s * a[2];
}

/// Euclidean norm.
#[inline]
pub fn norm(a: Vector3) -> f64 {
    dot(a, a).sqrt()
}

/// Normalise a 3D vector to unit length. If zero, return (0, 0, 1).
#[inline]
pub fn normalize(v: Vector3) -> Vector3 {
    let n2 = dot(v, v);
    if n2 == 0.0 {
        return [0.0, 0.0, 1.0];
    }
    let inv = 1.0 / n2.sqrt();
    [v[0] * inv, v[1] * inv, v[2] * inv]
}

/// Normalise, or `None` for a zero (or non-finite) vector.
#[inline]
pub fn try_normalize(v: Vector3) -> Option<Vector3> {
    let n = norm(v);
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    Some(scale(v, 1.0 / n))
}

/// Outer product `s * a bᵀ`.
#[inline]
pub fn outer(a: Vector3, b: Vector3, s: f64) -> Block3 {
    let mut m = [[0.0; 3]; 3];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = s * a[r] * b[c];
        }
    }
    m
}

/// `s * I₃`
#[inline]
pub fn identity(s: f64) -> Block3 {
    [[s, 0.0, 0.0], [0.0, s, 0.0], [0.0, 0.0, s]]
}

#[inline]
pub fn transpose(m: Block3) -> Block3 {
    [
        [m[0][0], m[1][0], m[2][0]],
        [m[0][1], m[1][1], m[2][1]],
        [m[0][2], m[1][2], m[2][2]],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_is_right_handed() {
        assert_eq!(cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_eq!(cross([0.0, 1.0, 0.0], [1.0, 0.0, 0.0]), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn try_normalize_rejects_zero() {
        assert!(try_normalize([0.0; 3]).is_none());
        let n = try_normalize([3.0, 0.0, 4.0]).unwrap();
        assert!((norm(n) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn outer_and_transpose_agree() {
        let a = [1.0, 2.0, 3.0];
        let b = [-1.0, 0.5, 2.0];
        assert_eq!(transpose(outer(a, b, 2.0)), outer(b, a, 2.0));
    }
}

// src/neighbours.rs
//
// Pair enumeration for the Heisenberg model.
//
// A pair (i, j, T) couples site i to the periodic image of site j shifted by T whole
// system lengths along each axis:
//   r_ij = positions[j] + Σ_k T_k · n_cells_k · a_k − positions[i]
//
// Every bond is stored once, in canonical orientation (i < j, or i == j with T > 0
// lexicographically). Pairs that would cross an open (non-periodic) axis are never
// generated, so changing boundary conditions means regenerating the lists.

use serde::{Deserialize, Serialize};

use crate::error::{HamiltonianError, Result};
use crate::geometry::Geometry;
use crate::params::{Chirality, DIPOLAR_PREFACTOR};
use crate::vec3::{add, cross, norm, scale, sub, try_normalize, Vector3};

/// Two distances closer than this belong to the same shell.
pub const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Upper bound on the translation window used when searching for shell radii.
const MAX_SHELL_WINDOW: i32 = 64;

/// Upper bound on the per-axis translation window of a cutoff-radius search. The
/// work grows with the cube of the window, so larger radii are rejected up front.
pub const MAX_PAIR_WINDOW: i32 = 64;

/// A bond between site `i` and a periodic image of site `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair {
    pub i: usize,
    pub j: usize,
    pub translation: [i32; 3],
}

impl Pair {
    pub fn new(i: usize, j: usize, translation: [i32; 3]) -> Self {
        Self { i, j, translation }
    }

    /// True for the orientation in which a bond is stored.
    pub fn is_canonical(&self) -> bool {
        self.i < self.j || (self.i == self.j && self.translation > [0, 0, 0])
    }

    /// The same bond seen from the other end.
    pub fn reversed(&self) -> Self {
        let t = self.translation;
        Self {
            i: self.j,
            j: self.i,
            translation: [-t[0], -t[1], -t[2]],
        }
    }

    /// True if the bond leaves the system through an axis that is not periodic.
    pub fn crosses_open_boundary(&self, boundary_conditions: [bool; 3]) -> bool {
        (0..3).any(|k| self.translation[k] != 0 && !boundary_conditions[k])
    }

    /// Vector from site i to the image of site j.
    pub fn separation(&self, geometry: &Geometry) -> Vector3 {
        let rj = add(geometry.positions[self.j], geometry.translation_vector(self.translation));
        sub(rj, geometry.positions[self.i])
    }
}

/// Translation window (in unit cells, per axis) that contains every partner within `radius`.
fn search_window(geometry: &Geometry, boundary_conditions: [bool; 3], radius: f64) -> [i32; 3] {
    let reach = radius + geometry.max_basis_separation();
    let mut window = [0; 3];
    for k in 0..3 {
        let w = (reach * norm(geometry.reciprocal()[k]) + DISTANCE_TOLERANCE).floor() as i64 + 1;
        let w = if boundary_conditions[k] {
            w
        } else {
            w.min(geometry.n_cells[k] as i64 - 1)
        };
        window[k] = w.clamp(0, i32::MAX as i64) as i32;
    }
    window
}

/// Reject a cutoff radius whose search window would exceed [`MAX_PAIR_WINDOW`].
pub fn check_search_window(geometry: &Geometry, boundary_conditions: [bool; 3], radius: f64) -> Result<()> {
    let window = search_window(geometry, boundary_conditions, radius);
    let widest = window.iter().copied().max().unwrap_or(0);
    if widest > MAX_PAIR_WINDOW {
        return Err(HamiltonianError::RadiusTooLarge {
            radius,
            window: widest,
            max: MAX_PAIR_WINDOW,
        });
    }
    Ok(())
}

/// Call `f(pair, r_ij, |r_ij|)` for every canonical pair with 0 < |r_ij| <= radius.
fn for_each_pair_within<F>(geometry: &Geometry, boundary_conditions: [bool; 3], radius: f64, mut f: F)
where
    F: FnMut(Pair, Vector3, f64),
{
    let window = search_window(geometry, boundary_conditions, radius);
    let nb = geometry.n_cell_atoms();

    for i in 0..geometry.nos() {
        let (bi, ci) = geometry.cell_of(i);
        for dc in -window[2]..=window[2] {
            for db in -window[1]..=window[1] {
                for da in -window[0]..=window[0] {
                    let d = [da, db, dc];

                    // Wrap the target cell on periodic axes, drop it on open ones.
                    let mut cell = [0usize; 3];
                    let mut translation = [0i32; 3];
                    let mut inside = true;
                    for k in 0..3 {
                        let n = geometry.n_cells[k] as i64;
                        let c = ci[k] as i64 + d[k] as i64;
                        if boundary_conditions[k] {
                            cell[k] = c.rem_euclid(n) as usize;
                            translation[k] = c.div_euclid(n) as i32;
                        } else if c < 0 || c >= n {
                            inside = false;
                            break;
                        } else {
                            cell[k] = c as usize;
                        }
                    }
                    if !inside {
                        continue;
                    }

                    let offset = geometry.cell_origin([da as isize, db as isize, dc as isize]);
                    for bj in 0..nb {
                        let pair = Pair::new(i, geometry.idx(bj, cell), translation);
                        if !pair.is_canonical() {
                            continue;
                        }
                        let r = add(offset, sub(geometry.cell_atoms[bj], geometry.cell_atoms[bi]));
                        let dist = norm(r);
                        if dist < DISTANCE_TOLERANCE || dist > radius + DISTANCE_TOLERANCE {
                            continue;
                        }
                        f(pair, r, dist);
                    }
                }
            }
        }
    }
}

/// Sort and merge distances closer than `DISTANCE_TOLERANCE`.
fn distinct_distances(mut distances: Vec<f64>) -> Vec<f64> {
    distances.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::new();
    for d in distances {
        match out.last() {
            Some(&last) if d - last < DISTANCE_TOLERANCE => {}
            _ => out.push(d),
        }
    }
    out
}

/// Radii of the first `n_shells` neighbour shells.
///
/// Shells are distance classes of the bulk lattice spanned by the active axes (an
/// axis is active when it has more than one cell or is periodic).
pub fn shell_radii(geometry: &Geometry, boundary_conditions: [bool; 3], n_shells: usize) -> Vec<f64> {
    if n_shells == 0 {
        return Vec::new();
    }

    let active: Vec<bool> = (0..3)
        .map(|k| geometry.n_cells[k] > 1 || boundary_conditions[k])
        .collect();
    let dmax = geometry.max_basis_separation();
    let nb = geometry.n_cell_atoms();

    let mut window = (n_shells.min(MAX_SHELL_WINDOW as usize) as i32).max(1);
    loop {
        // Every distance below `complete` has all of its offsets inside the window.
        let complete = (0..3)
            .filter(|&k| active[k])
            .map(|k| (window + 1) as f64 / norm(geometry.reciprocal()[k]) - dmax)
            .fold(f64::INFINITY, f64::min);

        let w: Vec<i32> = (0..3).map(|k| if active[k] { window } else { 0 }).collect();
        let mut distances = Vec::new();
        for dc in -w[2]..=w[2] {
            for db in -w[1]..=w[1] {
                for da in -w[0]..=w[0] {
                    let offset = geometry.cell_origin([da as isize, db as isize, dc as isize]);
                    for bi in 0..nb {
                        for bj in 0..nb {
                            let r = add(offset, sub(geometry.cell_atoms[bj], geometry.cell_atoms[bi]));
                            let dist = norm(r);
                            if dist > DISTANCE_TOLERANCE {
                                distances.push(dist);
                            }
                        }
                    }
                }
            }
        }

        let mut radii = distinct_distances(distances);
        radii.retain(|&r| r < complete - DISTANCE_TOLERANCE);

        if radii.len() >= n_shells || !complete.is_finite() || window >= MAX_SHELL_WINDOW {
            radii.truncate(n_shells);
            return radii;
        }
        window = (window * 2).min(MAX_SHELL_WINDOW);
    }
}

/// All pairs in the first `n_shells` shells, tagged with their shell index.
pub fn pairs_in_shells(geometry: &Geometry, boundary_conditions: [bool; 3], n_shells: usize) -> Vec<(Pair, usize)> {
    let radii = shell_radii(geometry, boundary_conditions, n_shells);
    let Some(&r_max) = radii.last() else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for_each_pair_within(geometry, boundary_conditions, r_max, |pair, _, dist| {
        if let Some(shell) = radii.iter().position(|&r| (r - dist).abs() < DISTANCE_TOLERANCE) {
            pairs.push((pair, shell));
        }
    });
    pairs.sort_by_key(|(pair, _)| *pair);
    pairs
}

/// All pairs with 0 < |r_ij| <= radius.
pub fn pairs_in_radius(geometry: &Geometry, boundary_conditions: [bool; 3], radius: f64) -> Vec<Pair> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let mut pairs = Vec::new();
    for_each_pair_within(geometry, boundary_conditions, radius, |pair, _, _| pairs.push(pair));
    pairs.sort();
    pairs
}

/// DMI direction of a shell pair: ±r̂ (Bloch) or ±ẑ × r̂ (Néel).
pub fn dmi_normal_from_pair(geometry: &Geometry, pair: &Pair, chirality: Chirality) -> Vector3 {
    let r = pair.separation(geometry);
    let dir = if chirality.is_neel() { cross([0.0, 0.0, 1.0], r) } else { r };
    match try_normalize(dir) {
        Some(n) => scale(n, chirality.sign()),
        None => [0.0; 3],
    }
}

/// Dipolar coupling of a pair per unit moments: (μ0 μ_B² / 4π r³, r̂).
pub fn ddi_from_pair(geometry: &Geometry, pair: &Pair) -> (f64, Vector3) {
    let r = pair.separation(geometry);
    let dist = norm(r);
    assert!(dist > DISTANCE_TOLERANCE, "dipolar pair {:?} has zero length", pair);
    (DIPOLAR_PREFACTOR / (dist * dist * dist), scale(r, 1.0 / dist))
}

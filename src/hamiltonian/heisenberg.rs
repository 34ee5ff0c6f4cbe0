// src/hamiltonian/heisenberg.rs
//
// Classical Heisenberg model on a lattice:
//   Zeeman + uniaxial anisotropy + exchange + DMI + dipole–dipole.
//
// The caller-facing inputs (μ_s per basis atom, shells or explicit pairs, cutoff
// radius) are stored as given. The per-bond lists the terms iterate over are derived
// from them and the boundary conditions; every setter rebuilds what it invalidates.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use nalgebra::DMatrix;

use super::{assert_field_shape, assert_hessian_shape, Hamiltonian};
use crate::error::{ensure_finite, ensure_len, HamiltonianError, Result};
use crate::geometry::Geometry;
use crate::neighbours::{self, Pair};
use crate::params::{
    AnisotropyParams, Chirality, Dmi, DmiPair, Exchange, ExchangePair, HeisenbergParams, MU_B,
};
use crate::terms::{AnisotropyTerm, DipolarTerm, DmiTerm, ExchangeTerm, ZeemanTerm};
use crate::vec3::{scale, try_normalize, Vector3};

/// One entry of the energy decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    Zeeman,
    Anisotropy,
    Exchange,
    Dmi,
    Ddi,
}

impl Contribution {
    pub fn name(self) -> &'static str {
        match self {
            Contribution::Zeeman => "Zeeman",
            Contribution::Anisotropy => "Anisotropy",
            Contribution::Exchange => "Exchange",
            Contribution::Dmi => "DMI",
            Contribution::Ddi => "DDI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HamiltonianHeisenberg {
    geometry: Arc<Geometry>,
    boundary_conditions: [bool; 3],

    // inputs
    mu_s: Vec<f64>,
    exchange_input: Exchange,
    dmi_input: Dmi,
    ddi_cutoff_radius: f64,

    // derived
    site_mu_s: Vec<f64>,
    zeeman: ZeemanTerm,
    anisotropy: AnisotropyTerm,
    exchange: ExchangeTerm,
    dmi: DmiTerm,
    ddi: DipolarTerm,
    contributions: Vec<Contribution>,
}

fn unit_direction(v: Vector3, what: &'static str) -> Result<Vector3> {
    if !v.iter().all(|x| x.is_finite()) {
        return Err(HamiltonianError::NonFinite(what));
    }
    try_normalize(v).ok_or(HamiltonianError::ZeroDirection(what))
}

fn check_site(index: usize, nos: usize) -> Result<()> {
    if index < nos {
        Ok(())
    } else {
        Err(HamiltonianError::SiteOutOfRange { index, nos })
    }
}

fn check_pair(pair: &Pair, nos: usize) -> Result<()> {
    check_site(pair.i, nos)?;
    check_site(pair.j, nos)?;
    if pair.i == pair.j && pair.translation == [0, 0, 0] {
        return Err(HamiltonianError::SelfPair(*pair));
    }
    Ok(())
}

/// Store each explicit bond once, in canonical orientation. `flip` adjusts the
/// per-bond data when a pair has to be turned around.
fn canonical_pairs<T>(
    entries: Vec<T>,
    nos: usize,
    pair_of: impl Fn(&T) -> Pair,
    flip: impl Fn(T) -> T,
) -> Result<Vec<T>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let pair = pair_of(&entry);
        check_pair(&pair, nos)?;
        let entry = if pair.is_canonical() { entry } else { flip(entry) };
        let pair = pair_of(&entry);
        if !seen.insert(pair) {
            return Err(HamiltonianError::DuplicatePair(pair));
        }
        out.push(entry);
    }
    Ok(out)
}

impl HamiltonianHeisenberg {
    pub fn new(geometry: Arc<Geometry>, params: HeisenbergParams) -> Result<Self> {
        let mut h = Self {
            geometry,
            boundary_conditions: params.boundary_conditions,
            mu_s: Vec::new(),
            exchange_input: Exchange::default(),
            dmi_input: Dmi::default(),
            ddi_cutoff_radius: 0.0,
            site_mu_s: Vec::new(),
            zeeman: ZeemanTerm::default(),
            anisotropy: AnisotropyTerm::default(),
            exchange: ExchangeTerm::default(),
            dmi: DmiTerm::default(),
            ddi: DipolarTerm::default(),
            contributions: Vec::new(),
        };

        h.mu_s = h.validated_mu_s(params.mu_s)?;
        h.zeeman = Self::validated_field(params.external_field_magnitude, params.external_field_normal)?;
        h.anisotropy = h.validated_anisotropy(params.anisotropy)?;
        h.exchange_input = h.validated_exchange(params.exchange)?;
        h.dmi_input = h.validated_dmi(params.dmi)?;
        h.ddi_cutoff_radius = h.validated_radius(params.ddi_radius, h.boundary_conditions)?;

        h.update_interactions();
        Ok(h)
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn nos(&self) -> usize {
        self.geometry.nos()
    }

    // ---- validation (never mutates) ----

    fn validated_mu_s(&self, mu_s: Vec<f64>) -> Result<Vec<f64>> {
        ensure_len("mu_s", self.geometry.n_cell_atoms(), mu_s.len())?;
        for &m in &mu_s {
            ensure_finite(m, "mu_s")?;
        }
        Ok(mu_s)
    }

    fn validated_field(magnitude: f64, normal: Vector3) -> Result<ZeemanTerm> {
        ensure_finite(magnitude, "external field magnitude")?;
        let normal = unit_direction(normal, "external field")?;
        Ok(ZeemanTerm {
            magnitude: magnitude * MU_B,
            normal,
        })
    }

    fn validated_anisotropy(&self, params: AnisotropyParams) -> Result<AnisotropyTerm> {
        let n = params.indices.len();
        ensure_len("anisotropy magnitudes", n, params.magnitudes.len())?;
        ensure_len("anisotropy normals", n, params.normals.len())?;
        let nos = self.nos();
        for &i in &params.indices {
            check_site(i, nos)?;
        }
        for &k in &params.magnitudes {
            ensure_finite(k, "anisotropy magnitude")?;
        }
        let normals = params
            .normals
            .into_iter()
            .map(|n| unit_direction(n, "anisotropy"))
            .collect::<Result<Vec<_>>>()?;
        Ok(AnisotropyTerm {
            indices: params.indices,
            magnitudes: params.magnitudes,
            normals,
        })
    }

    fn validated_exchange(&self, exchange: Exchange) -> Result<Exchange> {
        match exchange {
            Exchange::Shells(magnitudes) => {
                for &j in &magnitudes {
                    ensure_finite(j, "exchange magnitude")?;
                }
                Ok(Exchange::Shells(magnitudes))
            }
            Exchange::Pairs(pairs) => {
                for p in &pairs {
                    ensure_finite(p.magnitude, "exchange magnitude")?;
                }
                let pairs = canonical_pairs(
                    pairs,
                    self.nos(),
                    |p| p.pair,
                    |p| ExchangePair {
                        pair: p.pair.reversed(),
                        ..p
                    },
                )?;
                Ok(Exchange::Pairs(pairs))
            }
        }
    }

    fn validated_dmi(&self, dmi: Dmi) -> Result<Dmi> {
        match dmi {
            Dmi::Shells { magnitudes, chirality } => {
                for &d in &magnitudes {
                    ensure_finite(d, "DMI magnitude")?;
                }
                Ok(Dmi::Shells { magnitudes, chirality })
            }
            Dmi::Pairs(pairs) => {
                let pairs = pairs
                    .into_iter()
                    .map(|p| -> Result<DmiPair> {
                        ensure_finite(p.magnitude, "DMI magnitude")?;
                        Ok(DmiPair {
                            normal: unit_direction(p.normal, "DMI")?,
                            ..p
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                // s_j × s_i = −(s_i × s_j): a reversed bond keeps its energy with −n.
                let pairs = canonical_pairs(
                    pairs,
                    self.nos(),
                    |p| p.pair,
                    |p| DmiPair {
                        pair: p.pair.reversed(),
                        normal: scale(p.normal, -1.0),
                        ..p
                    },
                )?;
                Ok(Dmi::Pairs(pairs))
            }
        }
    }

    fn validated_radius(&self, radius: f64, boundary_conditions: [bool; 3]) -> Result<f64> {
        ensure_finite(radius, "DDI radius")?;
        if radius < 0.0 {
            return Err(HamiltonianError::NegativeRadius(radius));
        }
        neighbours::check_search_window(&self.geometry, boundary_conditions, radius)?;
        Ok(radius)
    }

    // ---- rebuilds ----

    /// Regenerate every pair list from the inputs and the current boundary conditions.
    fn update_interactions(&mut self) {
        let geometry = Arc::clone(&self.geometry);
        let bc = self.boundary_conditions;
        let nb = geometry.n_cell_atoms();

        self.site_mu_s = (0..geometry.nos()).map(|site| self.mu_s[site % nb]).collect();

        self.exchange = match &self.exchange_input {
            Exchange::Shells(magnitudes) => {
                let (pairs, js) = neighbours::pairs_in_shells(&geometry, bc, magnitudes.len())
                    .into_iter()
                    .map(|(pair, shell)| (pair, magnitudes[shell]))
                    .unzip();
                ExchangeTerm::new(pairs, js)
            }
            Exchange::Pairs(explicit) => {
                let (pairs, js) = explicit
                    .iter()
                    .filter(|p| !p.pair.crosses_open_boundary(bc))
                    .map(|p| (p.pair, p.magnitude))
                    .unzip();
                ExchangeTerm::new(pairs, js)
            }
        };

        self.dmi = match &self.dmi_input {
            Dmi::Shells { magnitudes, chirality } => {
                let shell_pairs = neighbours::pairs_in_shells(&geometry, bc, magnitudes.len());
                let mut term = DmiTerm::default();
                for (pair, shell) in shell_pairs {
                    term.normals
                        .push(neighbours::dmi_normal_from_pair(&geometry, &pair, *chirality));
                    term.magnitudes.push(magnitudes[shell]);
                    term.pairs.push(pair);
                }
                term
            }
            Dmi::Pairs(explicit) => {
                let mut term = DmiTerm::default();
                for p in explicit.iter().filter(|p| !p.pair.crosses_open_boundary(bc)) {
                    term.pairs.push(p.pair);
                    term.magnitudes.push(p.magnitude);
                    term.normals.push(p.normal);
                }
                term
            }
        };

        let mut ddi = DipolarTerm::default();
        for pair in neighbours::pairs_in_radius(&geometry, bc, self.ddi_cutoff_radius) {
            let (c, r_hat) = neighbours::ddi_from_pair(&geometry, &pair);
            ddi.magnitudes.push(c * self.site_mu_s[pair.i] * self.site_mu_s[pair.j]);
            ddi.normals.push(r_hat);
            ddi.pairs.push(pair);
        }
        self.ddi = ddi;

        debug!(
            "rebuilt interactions (bc={:?}): {} exchange, {} DMI, {} DDI pairs",
            bc,
            self.exchange.pairs.len(),
            self.dmi.pairs.len(),
            self.ddi.pairs.len()
        );

        self.update_energy_contributions();
    }

    /// Refresh the list of active contributions (fixed order).
    fn update_energy_contributions(&mut self) {
        self.contributions.clear();
        if !self.zeeman.is_zero() {
            self.contributions.push(Contribution::Zeeman);
        }
        if !self.anisotropy.is_empty() {
            self.contributions.push(Contribution::Anisotropy);
        }
        if !self.exchange.is_empty() {
            self.contributions.push(Contribution::Exchange);
        }
        if !self.dmi.is_empty() {
            self.contributions.push(Contribution::Dmi);
        }
        if !self.ddi.is_empty() {
            self.contributions.push(Contribution::Ddi);
        }
    }

    // ---- setters ----

    /// Fails if the current DDI cutoff would become too expensive to search.
    pub fn set_boundary_conditions(&mut self, boundary_conditions: [bool; 3]) -> Result<()> {
        self.validated_radius(self.ddi_cutoff_radius, boundary_conditions)?;
        self.boundary_conditions = boundary_conditions;
        self.update_interactions();
        Ok(())
    }

    /// Same moment on every basis atom.
    pub fn set_mu_s(&mut self, mu_s: f64) -> Result<()> {
        let mu_s = self.validated_mu_s(vec![mu_s; self.geometry.n_cell_atoms()])?;
        self.mu_s = mu_s;
        self.update_interactions();
        Ok(())
    }

    pub fn set_mu_s_per_atom(&mut self, mu_s: Vec<f64>) -> Result<()> {
        self.mu_s = self.validated_mu_s(mu_s)?;
        self.update_interactions();
        Ok(())
    }

    /// `magnitude` in Tesla.
    pub fn set_external_field(&mut self, magnitude: f64, normal: Vector3) -> Result<()> {
        self.zeeman = Self::validated_field(magnitude, normal)?;
        self.update_energy_contributions();
        Ok(())
    }

    /// Same uniaxial anisotropy on every site.
    pub fn set_anisotropy(&mut self, magnitude: f64, normal: Vector3) -> Result<()> {
        let nos = self.nos();
        let params = AnisotropyParams {
            indices: (0..nos).collect(),
            magnitudes: vec![magnitude; nos],
            normals: vec![normal; nos],
        };
        self.anisotropy = self.validated_anisotropy(params)?;
        self.update_energy_contributions();
        Ok(())
    }

    pub fn set_anisotropy_sites(
        &mut self,
        indices: Vec<usize>,
        magnitudes: Vec<f64>,
        normals: Vec<Vector3>,
    ) -> Result<()> {
        self.anisotropy = self.validated_anisotropy(AnisotropyParams {
            indices,
            magnitudes,
            normals,
        })?;
        self.update_energy_contributions();
        Ok(())
    }

    /// Replaces any explicit exchange pairs.
    pub fn set_exchange_shells(&mut self, magnitudes: Vec<f64>) -> Result<()> {
        self.exchange_input = self.validated_exchange(Exchange::Shells(magnitudes))?;
        self.update_interactions();
        Ok(())
    }

    /// Replaces any shell exchange.
    pub fn set_exchange_pairs(&mut self, pairs: Vec<ExchangePair>) -> Result<()> {
        self.exchange_input = self.validated_exchange(Exchange::Pairs(pairs))?;
        self.update_interactions();
        Ok(())
    }

    /// Replaces any explicit DMI pairs.
    pub fn set_dmi_shells(&mut self, magnitudes: Vec<f64>, chirality: Chirality) -> Result<()> {
        self.dmi_input = self.validated_dmi(Dmi::Shells { magnitudes, chirality })?;
        self.update_interactions();
        Ok(())
    }

    /// Replaces any shell DMI. Normals are normalised.
    pub fn set_dmi_pairs(&mut self, pairs: Vec<DmiPair>) -> Result<()> {
        self.dmi_input = self.validated_dmi(Dmi::Pairs(pairs))?;
        self.update_interactions();
        Ok(())
    }

    /// A radius of 0 disables DDI.
    pub fn set_ddi_radius(&mut self, radius: f64) -> Result<()> {
        self.ddi_cutoff_radius = self.validated_radius(radius, self.boundary_conditions)?;
        self.update_interactions();
        Ok(())
    }

    // ---- getters ----

    pub fn mu_s(&self) -> &[f64] {
        &self.mu_s
    }

    /// Moment of every site.
    pub fn site_mu_s(&self) -> &[f64] {
        &self.site_mu_s
    }

    /// (magnitude in Tesla, direction); `(0, ẑ)` when no positive field is set.
    pub fn external_field(&self) -> (f64, Vector3) {
        if self.zeeman.magnitude > 0.0 {
            (self.zeeman.magnitude / MU_B, self.zeeman.normal)
        } else {
            (0.0, [0.0, 0.0, 1.0])
        }
    }

    /// First anisotropy entry, or `(0, ẑ)` when there is none.
    pub fn anisotropy(&self) -> (f64, Vector3) {
        match (self.anisotropy.magnitudes.first(), self.anisotropy.normals.first()) {
            (Some(&k), Some(&n)) => (k, n),
            _ => (0.0, [0.0, 0.0, 1.0]),
        }
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange_input
    }

    pub fn dmi(&self) -> &Dmi {
        &self.dmi_input
    }

    /// Empty when exchange is given as explicit pairs.
    pub fn exchange_shell_magnitudes(&self) -> &[f64] {
        match &self.exchange_input {
            Exchange::Shells(m) => m,
            Exchange::Pairs(_) => &[],
        }
    }

    /// Shell magnitudes and chirality; no shells when DMI is given as explicit pairs.
    pub fn dmi_shells(&self) -> (&[f64], Chirality) {
        match &self.dmi_input {
            Dmi::Shells { magnitudes, chirality } => (magnitudes, *chirality),
            Dmi::Pairs(_) => (&[], Chirality::Bloch),
        }
    }

    pub fn ddi_cutoff_radius(&self) -> f64 {
        self.ddi_cutoff_radius
    }

    pub fn exchange_pairs(&self) -> &ExchangeTerm {
        &self.exchange
    }

    pub fn dmi_pairs(&self) -> &DmiTerm {
        &self.dmi
    }

    pub fn ddi_pairs(&self) -> &DipolarTerm {
        &self.ddi
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }
}

impl Hamiltonian for HamiltonianHeisenberg {
    fn energy_array(&self, spins: &[Vector3]) -> Vec<f64> {
        assert_eq!(spins.len(), self.nos(), "spin configuration has the wrong number of sites");
        self.contributions
            .iter()
            .map(|c| match c {
                Contribution::Zeeman => self.zeeman.energy(spins, &self.site_mu_s),
                Contribution::Anisotropy => self.anisotropy.energy(spins),
                Contribution::Exchange => self.exchange.energy(spins),
                Contribution::Dmi => self.dmi.energy(spins),
                Contribution::Ddi => self.ddi.energy(spins),
            })
            .collect()
    }

    fn contribution_names(&self) -> Vec<String> {
        self.contributions.iter().map(|c| c.name().to_string()).collect()
    }

    fn effective_field(&self, spins: &[Vector3], field: &mut [Vector3]) {
        assert_field_shape(self.nos(), spins, field);
        field.fill([0.0; 3]);
        for c in &self.contributions {
            match c {
                Contribution::Zeeman => self.zeeman.add_field(field, &self.site_mu_s),
                Contribution::Anisotropy => self.anisotropy.add_field(spins, field),
                Contribution::Exchange => self.exchange.add_field(spins, field),
                Contribution::Dmi => self.dmi.add_field(spins, field),
                Contribution::Ddi => self.ddi.add_field(spins, field),
            }
        }
    }

    fn hessian(&self, spins: &[Vector3], hessian: &mut DMatrix<f64>) {
        assert_hessian_shape(self.nos(), spins, hessian);
        hessian.fill(0.0);
        for c in &self.contributions {
            match c {
                // linear in the spins
                Contribution::Zeeman => {}
                Contribution::Anisotropy => self.anisotropy.add_hessian(hessian),
                Contribution::Exchange => self.exchange.add_hessian(hessian),
                Contribution::Dmi => self.dmi.add_hessian(hessian),
                Contribution::Ddi => self.ddi.add_hessian(hessian),
            }
        }
    }

    fn name(&self) -> &'static str {
        "Heisenberg"
    }

    fn boundary_conditions(&self) -> [bool; 3] {
        self.boundary_conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn chain(n: usize, bc: [bool; 3]) -> HamiltonianHeisenberg {
        let geometry = Arc::new(Geometry::simple_cubic([n, 1, 1], 1.0).unwrap());
        let params = HeisenbergParams {
            boundary_conditions: bc,
            ..HeisenbergParams::default()
        };
        HamiltonianHeisenberg::new(geometry, params).unwrap()
    }

    #[test]
    fn empty_model_has_no_contributions() {
        let h = chain(4, [true, false, false]);
        let spins = vec![[0.0, 0.0, 1.0]; 4];
        assert!(h.energy_array(&spins).is_empty());
        assert_eq!(h.energy(&spins), 0.0);
        assert_eq!(h.name(), "Heisenberg");
    }

    #[test]
    fn contributions_follow_fixed_order() {
        let mut h = chain(4, [true, false, false]);
        // set in reverse order on purpose
        h.set_ddi_radius(1.5).unwrap();
        h.set_dmi_shells(vec![0.3], Chirality::Bloch).unwrap();
        h.set_exchange_shells(vec![1.0]).unwrap();
        h.set_anisotropy(0.1, [0.0, 0.0, 2.0]).unwrap();
        h.set_external_field(1.0, [0.0, 0.0, 1.0]).unwrap();
        assert_eq!(
            h.contribution_names(),
            vec!["Zeeman", "Anisotropy", "Exchange", "DMI", "DDI"]
        );
        assert_eq!(h.anisotropy().1, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn external_field_is_reported_in_tesla() {
        let mut h = chain(2, [false; 3]);
        h.set_external_field(2.5, [0.0, 3.0, 0.0]).unwrap();
        let (b, n) = h.external_field();
        assert!(approx_eq(b, 2.5, 1e-12));
        assert_eq!(n, [0.0, 1.0, 0.0]);

        // aligned spins: E = −μ_s B μ_B per site
        let spins = vec![[0.0, 1.0, 0.0]; 2];
        assert!(approx_eq(h.energy(&spins), -2.0 * 2.5 * MU_B, 1e-12));

        h.set_external_field(0.0, [1.0, 0.0, 0.0]).unwrap();
        assert_eq!(h.external_field(), (0.0, [0.0, 0.0, 1.0]));
        assert!(h.contributions().is_empty());
    }

    #[test]
    fn invalid_input_leaves_state_unchanged() {
        let mut h = chain(3, [true, false, false]);
        h.set_ddi_radius(1.0).unwrap();
        let before = h.ddi_pairs().clone();

        assert!(matches!(h.set_ddi_radius(-1.0), Err(HamiltonianError::NegativeRadius(_))));
        assert!(matches!(
            h.set_mu_s_per_atom(vec![1.0, 2.0]),
            Err(HamiltonianError::LengthMismatch { .. })
        ));
        assert!(matches!(
            h.set_external_field(1.0, [0.0; 3]),
            Err(HamiltonianError::ZeroDirection(_))
        ));
        assert!(matches!(
            h.set_exchange_pairs(vec![ExchangePair {
                pair: Pair::new(0, 7, [0, 0, 0]),
                magnitude: 1.0
            }]),
            Err(HamiltonianError::SiteOutOfRange { index: 7, nos: 3 })
        ));

        assert_eq!(h.ddi_cutoff_radius(), 1.0);
        assert_eq!(h.ddi_pairs(), &before);
        assert!(h.exchange_pairs().is_empty());
    }

    #[test]
    fn shells_and_pairs_replace_each_other() {
        let mut h = chain(4, [false; 3]);
        h.set_exchange_shells(vec![1.0]).unwrap();
        assert_eq!(h.exchange_pairs().pairs.len(), 3);

        h.set_exchange_pairs(vec![ExchangePair {
            pair: Pair::new(0, 2, [0, 0, 0]),
            magnitude: 0.5,
        }])
        .unwrap();
        assert!(h.exchange_shell_magnitudes().is_empty());
        assert_eq!(h.exchange_pairs().pairs, vec![Pair::new(0, 2, [0, 0, 0])]);

        h.set_exchange_shells(vec![2.0]).unwrap();
        assert_eq!(h.exchange_shell_magnitudes(), &[2.0]);
        assert!(matches!(h.exchange(), Exchange::Shells(_)));
        assert_eq!(h.exchange_pairs().pairs.len(), 3);
    }

    #[test]
    fn explicit_pairs_return_when_boundary_is_closed_again() {
        let mut h = chain(4, [true, false, false]);
        let wrap = Pair::new(0, 3, [-1, 0, 0]);
        h.set_dmi_pairs(vec![DmiPair {
            pair: wrap,
            magnitude: 1.0,
            normal: [0.0, 0.0, 5.0],
        }])
        .unwrap();
        assert_eq!(h.dmi_pairs().pairs, vec![wrap]);
        assert_eq!(h.dmi_pairs().normals, vec![[0.0, 0.0, 1.0]]);

        h.set_boundary_conditions([false; 3]).unwrap();
        assert!(h.dmi_pairs().is_empty());
        assert!(!h.contributions().contains(&Contribution::Dmi));

        h.set_boundary_conditions([true, false, false]).unwrap();
        assert_eq!(h.dmi_pairs().pairs, vec![wrap]);
    }

    #[test]
    fn dipolar_magnitudes_scale_with_both_moments() {
        let mut h = chain(2, [false; 3]);
        h.set_ddi_radius(1.0).unwrap();
        let c1 = h.ddi_pairs().magnitudes[0];
        h.set_mu_s(2.0).unwrap();
        let c2 = h.ddi_pairs().magnitudes[0];
        assert!(approx_eq(c2, 4.0 * c1, 1e-15));
        assert_eq!(h.mu_s(), &[2.0]);
        assert_eq!(h.site_mu_s(), &[2.0, 2.0]);
    }

    #[test]
    fn dmi_chirality_is_kept_with_shells() {
        let mut h = chain(3, [false; 3]);
        h.set_dmi_shells(vec![0.2], Chirality::NeelInverse).unwrap();
        let (m, c) = h.dmi_shells();
        assert_eq!(m, &[0.2]);
        assert_eq!(c, Chirality::NeelInverse);
        // bond along x, Néel normal −ẑ × x̂ = −ŷ
        for n in &h.dmi_pairs().normals {
            assert!(approx_eq(n[1], -1.0, 1e-12));
        }
    }

    #[test]
    #[should_panic]
    fn wrong_spin_count_is_a_defect() {
        let h = chain(3, [false; 3]);
        let mut field = vec![[0.0; 3]; 3];
        h.effective_field(&[[0.0, 0.0, 1.0]; 2], &mut field);
    }

    #[test]
    fn explicit_exchange_pairs_are_stored_once_in_canonical_order() {
        let mut h = chain(2, [false; 3]);
        let bond = |i, j, t| ExchangePair {
            pair: Pair::new(i, j, t),
            magnitude: 1.0,
        };

        h.set_exchange_pairs(vec![bond(1, 0, [0, 0, 0])]).unwrap();
        assert_eq!(h.exchange_pairs().pairs, vec![Pair::new(0, 1, [0, 0, 0])]);
        let spins = [[0.0, 0.0, 1.0]; 2];
        assert_eq!(h.energy(&spins), -1.0);

        assert!(matches!(
            h.set_exchange_pairs(vec![bond(0, 1, [0, 0, 0]), bond(1, 0, [0, 0, 0])]),
            Err(HamiltonianError::DuplicatePair(p)) if p == Pair::new(0, 1, [0, 0, 0])
        ));
        assert!(matches!(
            h.set_exchange_pairs(vec![bond(0, 1, [0, 0, 0]), bond(0, 0, [0, 0, 0])]),
            Err(HamiltonianError::SelfPair(_))
        ));
        assert_eq!(h.exchange_pairs().pairs, vec![Pair::new(0, 1, [0, 0, 0])]);
        assert_eq!(h.energy(&spins), -1.0);
    }

    #[test]
    fn reversed_dmi_pair_keeps_its_energy() {
        let mut h = chain(2, [false; 3]);
        h.set_dmi_pairs(vec![DmiPair {
            pair: Pair::new(1, 0, [0, 0, 0]),
            magnitude: 1.0,
            normal: [0.0, 0.0, 1.0],
        }])
        .unwrap();
        assert_eq!(h.dmi_pairs().pairs, vec![Pair::new(0, 1, [0, 0, 0])]);
        assert_eq!(h.dmi_pairs().normals, vec![[0.0, 0.0, -1.0]]);

        // as given: n · (s_1 × s_0) = z · (y × x) = −1
        let spins = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(h.energy(&spins), -1.0);

        let dup = |i, j, t: [i32; 3]| DmiPair {
            pair: Pair::new(i, j, t),
            magnitude: 1.0,
            normal: [0.0, 0.0, 1.0],
        };
        assert!(matches!(
            h.set_dmi_pairs(vec![dup(0, 1, [0, 0, 0]), dup(1, 0, [0, 0, 0])]),
            Err(HamiltonianError::DuplicatePair(_))
        ));
    }

    #[test]
    fn unbounded_ddi_search_is_rejected() {
        let mut h = chain(4, [true, false, false]);
        assert!(matches!(
            h.set_ddi_radius(1e9),
            Err(HamiltonianError::RadiusTooLarge { .. })
        ));
        assert_eq!(h.ddi_cutoff_radius(), 0.0);

        // fine while the axis is open, too large once it wraps
        h.set_boundary_conditions([false; 3]).unwrap();
        h.set_ddi_radius(200.0).unwrap();
        assert_eq!(h.ddi_pairs().pairs.len(), 6);
        assert!(h.set_boundary_conditions([true, false, false]).is_err());
        assert_eq!(h.boundary_conditions(), [false; 3]);
    }
}

//! Block-diagonal mass operators.
//!
//! The element mass matrix `M_ab = ∫ φ_a φ_b dx` is shared by all equations
//! of the system. Bernstein polynomials are non-negative, so the lumped
//! mass (row sums of M) is strictly positive.

use faer::{Mat, linalg::solvers::Solve};

use super::{GeometryCache, ShapeTables};
use crate::error::{DgError, Result};
use crate::types::ElementIndex;

/// Consistent and lumped mass of every element.
#[derive(Clone, Debug)]
pub struct MassOperators {
    n_dofs: usize,
    /// Consistent mass matrix per element
    mass: Vec<Mat<f64>>,
    /// Inverse consistent mass matrix per element
    mass_inv: Vec<Mat<f64>>,
    /// Lumped mass, nd entries per element
    lumped: Vec<f64>,
}

impl MassOperators {
    /// Assemble element mass matrices by quadrature and invert them.
    pub fn new(geometry: &GeometryCache, shapes: &ShapeTables) -> Result<Self> {
        let nd = shapes.n_dofs();
        let n_elements = geometry.n_elements();

        let mut mass = Vec::with_capacity(n_elements);
        let mut mass_inv = Vec::with_capacity(n_elements);
        let mut lumped = Vec::with_capacity(n_elements * nd);

        for e in ElementIndex::iter(n_elements) {
            let mut m = Mat::<f64>::zeros(nd, nd);
            for k in 0..shapes.n_quadrature_points() {
                let dx = geometry.measure(e, k);
                let phi = shapes.shape_at(k);
                for a in 0..nd {
                    for b in 0..nd {
                        m[(a, b)] += phi[a] * phi[b] * dx;
                    }
                }
            }

            let m_inv = invert(&m).ok_or(DgError::SingularMassMatrix(e))?;
            lumped.extend((0..nd).map(|a| (0..nd).map(|b| m[(a, b)]).sum::<f64>()));
            mass.push(m);
            mass_inv.push(m_inv);
        }

        Ok(Self {
            n_dofs: nd,
            mass,
            mass_inv,
            lumped,
        })
    }

    /// Number of dofs per element.
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// Number of elements.
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.mass.len()
    }

    /// Consistent mass matrix of element `e`.
    #[inline]
    pub fn matrix(&self, e: ElementIndex) -> &Mat<f64> {
        &self.mass[e]
    }

    /// Inverse consistent mass matrix of element `e`.
    #[inline]
    pub fn inverse(&self, e: ElementIndex) -> &Mat<f64> {
        &self.mass_inv[e]
    }

    /// Lumped mass of dof `j` in element `e`.
    #[inline]
    pub fn lumped(&self, e: ElementIndex, j: usize) -> f64 {
        self.lumped[e.as_usize() * self.n_dofs + j]
    }

    /// Lumped mass expanded to an `n_eq`-component state layout.
    pub fn lumped_state(&self, n_eq: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(n_eq * self.lumped.len());
        for _ in 0..n_eq {
            out.extend_from_slice(&self.lumped);
        }
        out
    }

    /// `out = M_e · x` for one scalar field of element `e`.
    pub fn apply(&self, e: ElementIndex, x: &[f64], out: &mut [f64]) {
        mat_vec(&self.mass[e], x, out);
    }

    /// `out = M_e⁻¹ · x` for one scalar field of element `e`.
    pub fn apply_inverse(&self, e: ElementIndex, x: &[f64], out: &mut [f64]) {
        mat_vec(&self.mass_inv[e], x, out);
    }

    /// `out = M_L⁻¹ · x` for one scalar field of element `e`.
    pub fn apply_lumped_inverse(&self, e: ElementIndex, x: &[f64], out: &mut [f64]) {
        let ml = &self.lumped[e.as_usize() * self.n_dofs..(e.as_usize() + 1) * self.n_dofs];
        for ((o, xi), m) in out.iter_mut().zip(x).zip(ml) {
            *o = xi / m;
        }
    }
}

fn mat_vec(m: &Mat<f64>, x: &[f64], out: &mut [f64]) {
    for (i, o) in out.iter_mut().enumerate() {
        *o = (0..m.ncols()).map(|j| m[(i, j)] * x[j]).sum();
    }
}

/// Inverse via LU with partial pivoting, solved against the identity.
///
/// Returns `None` if the result is not finite or fails the `M · M⁻¹ = I`
/// check. The check tolerance scales with `‖M‖∞ ‖M⁻¹‖∞`, which grows
/// quickly with the order of a Bernstein basis.
fn invert(m: &Mat<f64>) -> Option<Mat<f64>> {
    let n = m.nrows();
    if n == 0 || !(0..n).any(|i| m[(i, i)].abs() > 0.0) {
        return None;
    }
    let lu = m.as_ref().partial_piv_lu();
    let m_inv = lu.solve(&Mat::<f64>::identity(n, n));
    if !(0..n).all(|i| (0..n).all(|j| m_inv[(i, j)].is_finite())) {
        return None;
    }

    let condition = norm_inf(m) * norm_inf(&m_inv);
    let tol = (n as f64 * f64::EPSILON * condition).max(1e-12);
    let product = m * &m_inv;
    for i in 0..n {
        for j in 0..n {
            let expected = if i == j { 1.0 } else { 0.0 };
            let entry = product[(i, j)];
            if !entry.is_finite() || (entry - expected).abs() > tol {
                return None;
            }
        }
    }
    Some(m_inv)
}

/// Maximum absolute row sum.
fn norm_inf(m: &Mat<f64>) -> f64 {
    (0..m.nrows())
        .map(|i| (0..m.ncols()).map(|j| m[(i, j)].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

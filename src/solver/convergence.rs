//! Mass-weighted change between accepted states.
//!
//! For a proposed state u and the previously accepted state u_old, with
//! z = u - u_old:
//!
//! ```text
//! time accurate:  r = ‖M z‖₂ / dt          (consistent element mass)
//! steady state:   r = ‖M_L z‖₂ / dt        (lumped mass, diagonal)
//! ```
//!
//! After each check the monitor stores u as the new reference state. The
//! caller's vector is never modified.

use crate::error::{DgError, Result};
use crate::operators::MassOperators;
use crate::types::{DofLayout, ElementIndex};

/// Tracks the rate of change of the discrete state.
#[derive(Clone, Debug)]
pub struct ConvergenceMonitor {
    mass: MassOperators,
    layout: DofLayout,
    steady_state: bool,
    /// Last accepted state
    u_old: Vec<f64>,
    /// Scratch for z and M z per element and equation
    z: Vec<f64>,
    mz: Vec<f64>,
    tolerance: Option<f64>,
    last_residual: Option<f64>,
    n_checks: usize,
}

impl ConvergenceMonitor {
    /// Create a monitor for `n_eq` equations starting from `initial`.
    ///
    /// `steady_state` selects the lumped mass weighting.
    pub fn new(mass: MassOperators, n_eq: usize, steady_state: bool, initial: &[f64]) -> Result<Self> {
        let nd = mass.n_dofs();
        let n_elements = mass.n_elements();
        let layout = DofLayout::new(n_eq, n_elements, nd, 0);
        if initial.len() != layout.state_len() {
            return Err(DgError::StateSizeMismatch {
                expected: layout.state_len(),
                actual: initial.len(),
            });
        }
        Ok(Self {
            mass,
            layout,
            steady_state,
            u_old: initial.to_vec(),
            z: vec![0.0; nd],
            mz: vec![0.0; nd],
            tolerance: None,
            last_residual: None,
            n_checks: 0,
        })
    }

    /// Set the threshold used by [`ConvergenceMonitor::is_converged`].
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Weighted norm of `(u_new - u_old) / dt`; `u_new` becomes the reference.
    pub fn check(&mut self, u_new: &[f64], dt: f64) -> Result<f64> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(DgError::InvalidTimeStep(dt));
        }
        if u_new.len() != self.u_old.len() {
            return Err(DgError::StateSizeMismatch {
                expected: self.u_old.len(),
                actual: u_new.len(),
            });
        }

        let nd = self.layout.n_dofs;
        let mut sum = 0.0;
        for n in 0..self.layout.n_eq {
            for e in ElementIndex::iter(self.layout.n_elements) {
                let start = self.layout.state_index(n, e, 0);
                for j in 0..nd {
                    self.z[j] = u_new[start + j] - self.u_old[start + j];
                }
                if self.steady_state {
                    for j in 0..nd {
                        self.mz[j] = self.mass.lumped(e, j) * self.z[j];
                    }
                } else {
                    self.mass.apply(e, &self.z, &mut self.mz);
                }
                sum += self.mz.iter().map(|v| v * v).sum::<f64>();
            }
        }

        self.u_old.copy_from_slice(u_new);
        let residual = sum.sqrt() / dt;
        self.last_residual = Some(residual);
        self.n_checks += 1;
        Ok(residual)
    }

    /// Whether the last residual fell below the tolerance.
    ///
    /// Always `false` without a tolerance or before the first check.
    pub fn is_converged(&self) -> bool {
        matches!(
            (self.last_residual, self.tolerance),
            (Some(r), Some(tol)) if r < tol
        )
    }

    /// Result of the most recent check.
    pub fn last_residual(&self) -> Option<f64> {
        self.last_residual
    }

    /// Number of checks performed.
    pub fn n_checks(&self) -> usize {
        self.n_checks
    }

    /// Last accepted state.
    pub fn reference_state(&self) -> &[f64] {
        &self.u_old
    }

    /// Whether the lumped mass weighting is used.
    pub fn is_steady_state(&self) -> bool {
        self.steady_state
    }
}

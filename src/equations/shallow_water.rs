//! Shallow water equations in 1D and 2D.
//!
//! ∂h/∂t + ∇·(hu) = 0                         (mass conservation)
//! ∂(hu)/∂t + ∇·(hu ⊗ u + gh²/2 I) = 0         (momentum conservation)
//!
//! where:
//! - h = water depth
//! - u = velocity
//! - hu = momentum
//! - g = gravitational acceleration
//!
//! Flat bottom, no source terms.

use std::ops::Range;

use faer::Mat;

use super::{HyperbolicSystem, PointLocation};

/// Shallow water equations.
///
/// State vector: u = [h, hu] in 1D, [h, hu, hv] in 2D.
#[derive(Clone, Debug)]
pub struct ShallowWater {
    /// Gravitational acceleration
    pub g: f64,
    /// Spatial dimension (1 or 2)
    pub dim: usize,
    /// Depth below which a point is treated as dry (default 1e-10)
    pub h_min: f64,
}

impl ShallowWater {
    /// Create shallow water equations in `dim` dimensions.
    pub fn new(g: f64, dim: usize) -> Self {
        Self {
            g,
            dim,
            h_min: 1e-10,
        }
    }

    /// Set the dry-state depth threshold.
    pub fn with_h_min(mut self, h_min: f64) -> Self {
        self.h_min = h_min;
        self
    }

    /// Velocity component `c` of state `u`; zero in dry points.
    #[inline]
    pub fn velocity(&self, u: &[f64], c: usize) -> f64 {
        if u[0] > self.h_min {
            u[1 + c] / u[0]
        } else {
            0.0
        }
    }

    /// Wave celerity c = sqrt(gh).
    #[inline]
    pub fn celerity(&self, h: f64) -> f64 {
        (self.g * h.max(0.0)).sqrt()
    }
}

impl HyperbolicSystem for ShallowWater {
    fn n_eq(&self) -> usize {
        self.dim + 1
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn evaluate_flux(&self, u: &[f64], _at: &PointLocation<'_>, flux: &mut Mat<f64>) {
        let h = u[0];
        let pressure = 0.5 * self.g * h * h;
        for c in 0..self.dim {
            let vc = self.velocity(u, c);
            flux[(0, c)] = u[1 + c];
            for r in 0..self.dim {
                flux[(1 + r, c)] = u[1 + r] * vc + if r == c { pressure } else { 0.0 };
            }
        }
    }

    fn wave_speed(&self, u: &[f64], normal: &[f64], _at: &PointLocation<'_>) -> f64 {
        let un: f64 = (0..self.dim).map(|c| self.velocity(u, c) * normal[c]).sum();
        un.abs() + self.celerity(u[0])
    }

    fn momentum_components(&self) -> Option<Range<usize>> {
        Some(1..1 + self.dim)
    }

    fn name(&self) -> &'static str {
        "shallow_water"
    }
}

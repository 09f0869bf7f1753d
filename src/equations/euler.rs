//! Compressible Euler equations for an ideal gas.
//!
//! State vector u = [ρ, ρv, E] with momentum ρv of length `dim` and total
//! energy E. The pressure follows the ideal gas law
//!
//! p = (γ - 1) (E - |ρv|² / (2ρ))

use std::ops::Range;

use faer::Mat;

use super::{HyperbolicSystem, PointLocation};

/// Euler equations of gas dynamics.
#[derive(Clone, Debug)]
pub struct Euler {
    /// Ratio of specific heats
    pub gamma: f64,
    /// Spatial dimension (1 to 3)
    pub dim: usize,
}

impl Euler {
    /// Create Euler equations in `dim` dimensions.
    pub fn new(gamma: f64, dim: usize) -> Self {
        Self { gamma, dim }
    }

    /// Diatomic ideal gas (γ = 1.4).
    pub fn air(dim: usize) -> Self {
        Self::new(1.4, dim)
    }

    /// Pressure of state `u`.
    pub fn pressure(&self, u: &[f64]) -> f64 {
        let rho = u[0];
        let kinetic: f64 = u[1..1 + self.dim].iter().map(|m| m * m).sum::<f64>() / (2.0 * rho);
        (self.gamma - 1.0) * (u[1 + self.dim] - kinetic)
    }

    /// Speed of sound sqrt(γ p / ρ).
    pub fn sound_speed(&self, u: &[f64]) -> f64 {
        (self.gamma * self.pressure(u) / u[0]).sqrt()
    }
}

impl HyperbolicSystem for Euler {
    fn n_eq(&self) -> usize {
        self.dim + 2
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn evaluate_flux(&self, u: &[f64], _at: &PointLocation<'_>, flux: &mut Mat<f64>) {
        let rho = u[0];
        let energy = u[1 + self.dim];
        let p = self.pressure(u);
        for c in 0..self.dim {
            let vc = u[1 + c] / rho;
            flux[(0, c)] = u[1 + c];
            for r in 0..self.dim {
                flux[(1 + r, c)] = u[1 + r] * vc + if r == c { p } else { 0.0 };
            }
            flux[(1 + self.dim, c)] = (energy + p) * vc;
        }
    }

    fn wave_speed(&self, u: &[f64], normal: &[f64], _at: &PointLocation<'_>) -> f64 {
        let vn: f64 = (0..self.dim).map(|c| u[1 + c] * normal[c]).sum::<f64>() / u[0];
        vn.abs() + self.sound_speed(u)
    }

    fn momentum_components(&self) -> Option<Range<usize>> {
        Some(1..1 + self.dim)
    }

    fn name(&self) -> &'static str {
        "euler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ElementIndex;

    const TOL: f64 = 1e-12;

    fn at() -> PointLocation<'static> {
        PointLocation {
            element: ElementIndex::new(0),
            face: None,
            point: 0,
            x: &[],
        }
    }

    #[test]
    fn test_pressure() {
        let euler = Euler::air(1);
        // ρ = 1, ρv = 2, E = 5: p = 0.4 * (5 - 2) = 1.2
        assert!((euler.pressure(&[1.0, 2.0, 5.0]) - 1.2).abs() < TOL);
    }

    #[test]
    fn test_flux_1d() {
        let euler = Euler::air(1);
        let mut flux = Mat::zeros(3, 1);
        euler.evaluate_flux(&[1.0, 2.0, 5.0], &at(), &mut flux);
        assert!((flux[(0, 0)] - 2.0).abs() < TOL);
        assert!((flux[(1, 0)] - (4.0 + 1.2)).abs() < TOL);
        assert!((flux[(2, 0)] - (6.2 * 2.0)).abs() < TOL);
    }

    #[test]
    fn test_gas_at_rest_has_pure_pressure_flux() {
        let euler = Euler::air(2);
        let u = [1.2, 0.0, 0.0, 2.5];
        let mut flux = Mat::zeros(4, 2);
        euler.evaluate_flux(&u, &at(), &mut flux);
        let p = euler.pressure(&u);
        assert!((p - 1.0).abs() < TOL);
        assert!((flux[(1, 0)] - p).abs() < TOL);
        assert!((flux[(2, 1)] - p).abs() < TOL);
        assert!(flux[(1, 1)].abs() < TOL);
        assert!(flux[(3, 0)].abs() < TOL);
    }

    #[test]
    fn test_wave_speed() {
        let euler = Euler::air(1);
        let u = [1.0, 2.0, 5.0];
        let c = (1.4_f64 * 1.2).sqrt();
        assert!((euler.wave_speed(&u, &[1.0], &at()) - (2.0 + c)).abs() < TOL);
        assert!((euler.wave_speed(&u, &[-1.0], &at()) - (2.0 + c)).abs() < TOL);
    }
}

//! Scalar linear advection.
//!
//! ∂u/∂t + ∇·(v u) = 0
//!
//! with a prescribed, divergence-free velocity field v(x).

use faer::Mat;

use super::{HyperbolicSystem, PointLocation};

/// Prescribed advection velocity.
#[derive(Clone, Debug, PartialEq)]
pub enum VelocityField {
    /// Uniform velocity vector.
    Constant(Vec<f64>),
    /// 2D solid body rotation about `center` with angular speed `omega`:
    /// v = ω (-(y - y_c), x - x_c).
    Rotation { center: [f64; 2], omega: f64 },
}

/// Linear advection of a scalar.
#[derive(Clone, Debug)]
pub struct Advection {
    dim: usize,
    /// Velocity field
    pub velocity: VelocityField,
}

impl Advection {
    /// Advection with a uniform velocity vector; the dimension is its length.
    pub fn new(velocity: Vec<f64>) -> Self {
        Self {
            dim: velocity.len(),
            velocity: VelocityField::Constant(velocity),
        }
    }

    /// Counter-clockwise rotation about `center` in 2D.
    pub fn rotation(center: [f64; 2], omega: f64) -> Self {
        Self {
            dim: 2,
            velocity: VelocityField::Rotation { center, omega },
        }
    }

    /// Velocity component `c` at physical position `x`.
    #[inline]
    pub fn velocity_at(&self, x: &[f64], c: usize) -> f64 {
        match &self.velocity {
            VelocityField::Constant(v) => v[c],
            VelocityField::Rotation { center, omega } => match c {
                0 => -omega * (x[1] - center[1]),
                _ => omega * (x[0] - center[0]),
            },
        }
    }
}

impl HyperbolicSystem for Advection {
    fn n_eq(&self) -> usize {
        1
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn evaluate_flux(&self, u: &[f64], at: &PointLocation<'_>, flux: &mut Mat<f64>) {
        for c in 0..self.dim {
            flux[(0, c)] = self.velocity_at(at.x, c) * u[0];
        }
    }

    fn wave_speed(&self, _u: &[f64], normal: &[f64], at: &PointLocation<'_>) -> f64 {
        (0..self.dim)
            .map(|c| self.velocity_at(at.x, c) * normal[c])
            .sum::<f64>()
            .abs()
    }

    fn name(&self) -> &'static str {
        "advection"
    }
}

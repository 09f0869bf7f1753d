//! Hyperbolic system abstractions.
//!
//! Provides a trait-based interface for systems of conservation laws
//!
//! ∂u/∂t + ∇·F(u) = 0
//!
//! where u has `n_eq` components and the flux tensor F(u) is `n_eq × dim`.

mod advection;
mod euler;
mod shallow_water;

pub use advection::{Advection, VelocityField};
pub use euler::Euler;
pub use shallow_water::ShallowWater;

use std::ops::Range;

use faer::Mat;

use crate::types::ElementIndex;

/// Where a flux or wave speed is evaluated.
///
/// Systems with spatially varying coefficients read the physical position;
/// the indices identify the quadrature point for systems that tabulate
/// coefficients per point.
#[derive(Clone, Copy, Debug)]
pub struct PointLocation<'a> {
    /// Element owning the point
    pub element: ElementIndex,
    /// Local face, for face quadrature points
    pub face: Option<usize>,
    /// Quadrature point index within the element or face rule
    pub point: usize,
    /// Physical coordinates
    pub x: &'a [f64],
}

/// A system of hyperbolic conservation laws.
///
/// # Example
///
/// ```
/// use dg_hypsys::equations::{HyperbolicSystem, PointLocation, ShallowWater};
/// use dg_hypsys::types::ElementIndex;
/// use faer::Mat;
///
/// let swe = ShallowWater::new(1.0, 1);
/// let at = PointLocation { element: ElementIndex::new(0), face: None, point: 0, x: &[0.0] };
/// let mut flux = Mat::zeros(2, 1);
/// swe.evaluate_flux(&[2.0, 3.0], &at, &mut flux);
/// // [hu, hu²/h + gh²/2]
/// assert!((flux[(0, 0)] - 3.0).abs() < 1e-14);
/// assert!((flux[(1, 0)] - 6.5).abs() < 1e-14);
/// ```
pub trait HyperbolicSystem: Send + Sync {
    /// Number of conserved variables.
    fn n_eq(&self) -> usize;

    /// Spatial dimension.
    fn dim(&self) -> usize;

    /// Physical flux tensor F(u), written into `flux` (`n_eq × dim`).
    fn evaluate_flux(&self, u: &[f64], at: &PointLocation<'_>, flux: &mut Mat<f64>);

    /// Largest absolute wave speed of the system projected onto `normal`.
    fn wave_speed(&self, u: &[f64], normal: &[f64], at: &PointLocation<'_>) -> f64;

    /// Components holding the momentum vector, if the system has one.
    ///
    /// Used by reflective walls.
    fn momentum_components(&self) -> Option<Range<usize>> {
        None
    }

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

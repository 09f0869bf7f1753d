//! Lax-Friedrichs (local Rusanov) numerical flux for systems.
//!
//! At a face with outward unit normal n, interior state u⁻ and exterior
//! state u⁺:
//!
//! F^* = 0.5 * (F(u⁻) + F(u⁺)) · n + 0.5 * λ * (u⁻ - u⁺)
//!
//! where λ = max(λ(u⁻, n), λ(u⁺, n)) is the larger of the two wave speed
//! estimates along n.
//!
//! The flux is consistent, F^*(u, u, n) = F(u) · n, and conservative,
//! F^*(u⁻, u⁺, n) = -F^*(u⁺, u⁻, -n).

use faer::Mat;

use crate::equations::{HyperbolicSystem, PointLocation};

/// Caller-owned flux tensors for [`lax_friedrichs`].
#[derive(Clone, Debug)]
pub struct LaxFriedrichsScratch {
    flux_in: Mat<f64>,
    flux_out: Mat<f64>,
}

impl LaxFriedrichsScratch {
    /// Allocate scratch for a system with `n_eq` equations in `dim` dimensions.
    pub fn new(n_eq: usize, dim: usize) -> Self {
        Self {
            flux_in: Mat::zeros(n_eq, dim),
            flux_out: Mat::zeros(n_eq, dim),
        }
    }
}

/// Compute the Lax-Friedrichs numerical flux F^* · n into `out`.
///
/// # Arguments
/// * `system` - Provides the physical flux and wave speed estimates
/// * `u_in` - Interior state
/// * `u_out` - Exterior state (neighbor or boundary ghost)
/// * `normal` - Outward unit normal of the interior element
/// * `at` - Location of the face point
/// * `scratch` - Flux tensors sized for `system`
/// * `out` - Numerical normal flux, one value per equation
pub fn lax_friedrichs<S: HyperbolicSystem + ?Sized>(
    system: &S,
    u_in: &[f64],
    u_out: &[f64],
    normal: &[f64],
    at: &PointLocation<'_>,
    scratch: &mut LaxFriedrichsScratch,
    out: &mut [f64],
) {
    system.evaluate_flux(u_in, at, &mut scratch.flux_in);
    system.evaluate_flux(u_out, at, &mut scratch.flux_out);

    let lambda = system
        .wave_speed(u_in, normal, at)
        .max(system.wave_speed(u_out, normal, at));

    for (n, o) in out.iter_mut().enumerate() {
        let fn_sum: f64 = normal
            .iter()
            .enumerate()
            .map(|(c, nc)| (scratch.flux_in[(n, c)] + scratch.flux_out[(n, c)]) * nc)
            .sum();
        *o = 0.5 * (fn_sum + lambda * (u_in[n] - u_out[n]));
    }
}

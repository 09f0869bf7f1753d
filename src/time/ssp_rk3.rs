//! Strong Stability Preserving Runge-Kutta time integration.
//!
//! SSP-RK3 (Shu-Osher form) is optimal for hyperbolic conservation laws.
//! It maintains the TVD property of the spatial discretization.

use crate::error::Result;
use crate::solver::DgState;

/// Perform one forward Euler step: u ← u + dt L(u, t).
///
/// `rhs_fn(u, t, out)` writes L(u, t) into `out`.
pub fn forward_euler_step<F>(u: &mut DgState, mut rhs_fn: F, t: f64, dt: f64) -> Result<()>
where
    F: FnMut(&DgState, f64, &mut DgState) -> Result<()>,
{
    let mut l_u = DgState::zeros_like(u);
    rhs_fn(u, t, &mut l_u)?;
    u.axpy(dt, &l_u);
    Ok(())
}

/// Perform one step of SSP-RK3 time integration.
///
/// The Shu-Osher form:
/// u1 = u + dt * L(u, t)
/// u2 = 3/4 * u + 1/4 * u1 + 1/4 * dt * L(u1, t + dt)
/// u_new = 1/3 * u + 2/3 * u2 + 2/3 * dt * L(u2, t + dt/2)
///
/// # Arguments
/// * `u` - Solution to update (modified in place)
/// * `rhs_fn` - Writes L(u, t) into its last argument
/// * `t` - Current time
/// * `dt` - Time step
///
/// Errors from `rhs_fn` abort the step and leave `u` untouched.
pub fn ssp_rk3_step<F>(u: &mut DgState, mut rhs_fn: F, t: f64, dt: f64) -> Result<()>
where
    F: FnMut(&DgState, f64, &mut DgState) -> Result<()>,
{
    let mut l = DgState::zeros_like(u);

    // Stage 1
    rhs_fn(u, t, &mut l)?;
    let mut u1 = u.clone();
    u1.axpy(dt, &l);

    // Stage 2
    rhs_fn(&u1, t + dt, &mut l)?;
    let mut u2 = u.clone();
    u2.scale(0.75);
    u2.axpy(0.25, &u1);
    u2.axpy(0.25 * dt, &l);

    // Stage 3
    rhs_fn(&u2, t + 0.5 * dt, &mut l)?;
    u.scale(1.0 / 3.0);
    u.axpy(2.0 / 3.0, &u2);
    u.axpy(2.0 / 3.0 * dt, &l);
    Ok(())
}

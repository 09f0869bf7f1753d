//! Time integration methods.
//!
//! Explicit steppers act on [`crate::solver::DgState`] through a right-hand
//! side closure, so they work with any operator that fills `L(u, t)`.

mod ssp_rk3;
mod steady_state;

pub use ssp_rk3::{forward_euler_step, ssp_rk3_step};
pub use steady_state::{SteadyStateConfig, SteadyStateReport, run_steady_state};
